// crates/edge/src/handlers/cart.rs

//! JSON cart operations keyed by the `cartId` cookie. The commerce backend
//! owns the cart; nothing is kept locally.

use crate::{error::Error, state::AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use domain::commerce::{Cart, CartLineInput, CartLineUpdate};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

pub const CART_COOKIE: &str = "cartId";

#[derive(Debug, Deserialize)]
pub struct AddLines {
    pub lines: Vec<CartLineInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLines {
    pub lines: Vec<CartLineUpdate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLines {
    pub line_ids: Vec<String>,
}

fn cart_id(jar: &CookieJar) -> Option<String> {
    jar.get(CART_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|id| !id.is_empty())
}

fn missing_cart() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "Missing cart" }))).into_response()
}

fn with_cookie(jar: CookieJar, cart: &Cart) -> CookieJar {
    jar.add(
        Cookie::build((CART_COOKIE, cart.id.clone()))
            .path("/")
            .http_only(true),
    )
}

/// The current cart, or `null` when there is none.
#[tracing::instrument(skip_all)]
pub async fn show(State(state): State<AppState>, jar: CookieJar) -> Result<Json<Option<Cart>>, Error> {
    let Some(id) = cart_id(&jar) else {
        return Ok(Json(None));
    };
    Ok(Json(state.backends.commerce.get_cart(&id).await?))
}

/// Adds lines; creates the cart (and sets the cookie) when there is none or
/// the cookie names a cart the backend no longer knows.
#[tracing::instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<AddLines>,
) -> Result<Response, Error> {
    let commerce = &state.backends.commerce;
    let existing = match cart_id(&jar) {
        Some(id) => commerce.get_cart(&id).await?.map(|cart| cart.id),
        None => None,
    };
    let cart = match existing {
        Some(id) => commerce.add_to_cart(&id, body.lines).await?,
        None => {
            debug!("starting a new cart");
            commerce.create_cart(body.lines).await?
        }
    };
    Ok((with_cookie(jar, &cart), Json(cart)).into_response())
}

#[tracing::instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<UpdateLines>,
) -> Result<Response, Error> {
    let Some(id) = cart_id(&jar) else {
        return Ok(missing_cart());
    };
    let cart = state.backends.commerce.update_cart(&id, body.lines).await?;
    Ok(Json(cart).into_response())
}

#[tracing::instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RemoveLines>,
) -> Result<Response, Error> {
    let Some(id) = cart_id(&jar) else {
        return Ok(missing_cart());
    };
    let cart = state
        .backends
        .commerce
        .remove_from_cart(&id, body.line_ids)
        .await?;
    Ok(Json(cart).into_response())
}
