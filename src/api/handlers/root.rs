use axum::{http::StatusCode, response::IntoResponse};
use tracing::instrument;

// axum handler for root
#[instrument]
pub async fn root() -> impl IntoResponse {
    (
        StatusCode::OK,
        concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")),
    )
}
