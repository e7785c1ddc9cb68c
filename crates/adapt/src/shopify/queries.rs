// crates/adapt/src/shopify/queries.rs

//! Storefront API documents. Fragments are macros so they can be spliced into
//! each operation with `concat!`.

macro_rules! image_fragment {
    () => {
        "fragment image on Image { url altText width height }\n"
    };
}

macro_rules! seo_fragment {
    () => {
        "fragment seo on SEO { description title }\n"
    };
}

macro_rules! product_fragment {
    () => {
        concat!(
            "fragment product on Product {
  id handle availableForSale title description descriptionHtml
  options { id name values }
  priceRange {
    maxVariantPrice { amount currencyCode }
    minVariantPrice { amount currencyCode }
  }
  variants(first: 250) {
    edges { node {
      id title availableForSale
      selectedOptions { name value }
      price { amount currencyCode }
      sku
    } }
  }
  featuredImage { ...image }
  images(first: 20) { edges { node { ...image } } }
  seo { ...seo }
  tags updatedAt
}\n",
            image_fragment!(),
            seo_fragment!()
        )
    };
}

macro_rules! cart_fragment {
    () => {
        concat!(
            "fragment cart on Cart {
  id checkoutUrl
  cost {
    subtotalAmount { amount currencyCode }
    totalAmount { amount currencyCode }
    totalTaxAmount { amount currencyCode }
  }
  lines(first: 100) {
    edges { node {
      id quantity
      cost { totalAmount { amount currencyCode } }
      merchandise { ... on ProductVariant {
        id title
        selectedOptions { name value }
        product { handle title featuredImage { ...image } }
      } }
    } }
  }
  totalQuantity
}\n",
            image_fragment!()
        )
    };
}

macro_rules! page_fragment {
    () => {
        concat!(
            "fragment page on Page { id handle title body bodySummary seo { ...seo } createdAt updatedAt }\n",
            seo_fragment!()
        )
    };
}

macro_rules! collection_fragment {
    () => {
        concat!(
            "fragment collection on Collection { handle title description seo { ...seo } image { ...image } updatedAt }\n",
            seo_fragment!(),
            image_fragment!()
        )
    };
}

pub const GET_PAGE: &str = concat!(
    "query getPage($handle: String!) { page: pageByHandle(handle: $handle) { ...page } }\n",
    page_fragment!()
);

pub const GET_PAGES: &str = concat!(
    "query getPages { pages(first: 100) { edges { node { ...page } } } }\n",
    page_fragment!()
);

pub const GET_PRODUCT: &str = concat!(
    "query getProduct($handle: String!) { product(handle: $handle) { ...product } }\n",
    product_fragment!()
);

pub const GET_PRODUCTS: &str = concat!(
    "query getProducts($sortKey: ProductSortKeys, $reverse: Boolean, $query: String) {
  products(sortKey: $sortKey, reverse: $reverse, query: $query, first: 100) { edges { node { ...product } } }
}\n",
    product_fragment!()
);

pub const GET_COLLECTION: &str = concat!(
    "query getCollection($handle: String!) { collection(handle: $handle) { ...collection } }\n",
    collection_fragment!()
);

pub const GET_COLLECTIONS: &str = concat!(
    "query getCollections { collections(first: 100, sortKey: TITLE) { edges { node { ...collection } } } }\n",
    collection_fragment!()
);

pub const GET_COLLECTION_PRODUCTS: &str = concat!(
    "query getCollectionProducts($handle: String!, $sortKey: ProductCollectionSortKeys, $reverse: Boolean) {
  collection(handle: $handle) {
    products(sortKey: $sortKey, reverse: $reverse, first: 100) { edges { node { ...product } } }
  }
}\n",
    product_fragment!()
);

pub const GET_CART: &str = concat!(
    "query getCart($cartId: ID!) { cart(id: $cartId) { ...cart } }\n",
    cart_fragment!()
);

// Mutations alias their root field to `payload` so one envelope decodes all.

pub const CREATE_CART: &str = concat!(
    "mutation createCart($lineItems: [CartLineInput!]) {
  payload: cartCreate(input: { lines: $lineItems }) { cart { ...cart } userErrors { field message } }
}\n",
    cart_fragment!()
);

pub const ADD_TO_CART: &str = concat!(
    "mutation addToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  payload: cartLinesAdd(cartId: $cartId, lines: $lines) { cart { ...cart } userErrors { field message } }
}\n",
    cart_fragment!()
);

pub const REMOVE_FROM_CART: &str = concat!(
    "mutation removeFromCart($cartId: ID!, $lineIds: [ID!]!) {
  payload: cartLinesRemove(cartId: $cartId, lineIds: $lineIds) { cart { ...cart } userErrors { field message } }
}\n",
    cart_fragment!()
);

pub const UPDATE_CART: &str = concat!(
    "mutation updateCart($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  payload: cartLinesUpdate(cartId: $cartId, lines: $lines) { cart { ...cart } userErrors { field message } }
}\n",
    cart_fragment!()
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_are_spliced_once_per_document() {
        assert_eq!(GET_CART.matches("fragment cart on Cart").count(), 1);
        assert_eq!(GET_CART.matches("fragment image on Image").count(), 1);
        assert!(GET_PRODUCT.contains("fragment seo on SEO"));
        assert!(CREATE_CART.contains("payload: cartCreate"));
    }
}
