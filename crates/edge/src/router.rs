// crates/edge/src/router.rs

use crate::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// All storefront routes. Static segments win over `/{slug}`.
#[tracing::instrument(skip_all)]
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::page::home))
        .route("/blog", get(handlers::blog::index))
        .route("/blog/{post}", get(handlers::page::blog_post))
        .route(
            "/blog/{post}/opengraph-image",
            get(handlers::og::blog_post_image),
        )
        .route("/api/newsletter", post(handlers::newsletter::subscribe))
        .route("/api/preview", get(handlers::preview::enter))
        .route("/api/revalidate", post(handlers::revalidate::webhook))
        .route("/api/cart", get(handlers::cart::show))
        .route(
            "/api/cart/lines",
            post(handlers::cart::add)
                .patch(handlers::cart::update)
                .delete(handlers::cart::remove),
        )
        .route("/{slug}", get(handlers::page::show))
        .route("/{slug}/opengraph-image", get(handlers::og::image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
