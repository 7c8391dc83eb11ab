//! The fallback handler for unknown routes.

use axum::response::{IntoResponse, Response};

use crate::Error;

/// Respond to a request for a route that does not exist.
pub async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
