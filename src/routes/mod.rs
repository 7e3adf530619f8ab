pub mod permalink;

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::responses::JsonResponse;
use crate::state::AppState;
use permalink::resolve_permalink;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/git/{commit_id}/{*path}", get(resolve_permalink))
        .with_state(state)
}

/// A simple root route.
async fn root() -> Response {
    JsonResponse::success("cwlviewer permalink service").into_response()
}
