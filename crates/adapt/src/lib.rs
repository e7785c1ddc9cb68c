//! Concrete backends for the storefront seams in `serve::backend`.

pub mod cache;
pub mod mailchimp;
pub mod shopify;
pub mod storyblok;

pub use cache::TaggedCache;
pub use mailchimp::{MailchimpClient, MailchimpError};
pub use shopify::{ShopifyClient, ShopifyError};
pub use storyblok::{StoryblokClient, StoryblokError};
