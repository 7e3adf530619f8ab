use axum::{
    body::Body,
    extract::{OriginalUri, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::{error, warn};

use crate::responses::JsonResponse;
use crate::services::permalink::{Disposition, Permalink, PermalinkError};
use crate::state::AppState;
use crate::utils::content_negotiation::negotiate;

impl IntoResponse for PermalinkError {
    fn into_response(self) -> Response {
        match self {
            PermalinkError::WorkflowNotFound => {
                JsonResponse::not_found("Workflow not found").into_response()
            }
            PermalinkError::RepresentationNotFound => JsonResponse::not_acceptable(
                "The requested representation is not available for this workflow",
            )
            .into_response(),
            other => {
                error!(error = %other, "permalink resolution failed");
                JsonResponse::server_error("Failed to resolve permalink").into_response()
            }
        }
    }
}

/// `GET /git/{commit_id}/{*path}`: serve the workflow at `path` as of
/// `commit_id` in whichever representation the `Accept` header selects.
pub async fn resolve_permalink(
    State(state): State<AppState>,
    Path((commit_id, _path)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let Some(representation) = negotiate(&headers) else {
        return PermalinkError::RepresentationNotFound.into_response();
    };

    let request_path = match urlencoding::decode(uri.path()) {
        Ok(path) => path.into_owned(),
        Err(_) => return JsonResponse::not_found("Workflow not found").into_response(),
    };

    match state
        .permalinks()
        .resolve(&commit_id, &request_path, representation)
        .await
    {
        Ok(link) => permalink_response(link).await,
        Err(err) => err.into_response(),
    }
}

async fn permalink_response(link: Permalink) -> Response {
    match link {
        Permalink::Redirect(location) => match HeaderValue::from_str(&location) {
            Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
            Err(_) => {
                warn!(%location, "redirect target is not a valid header value");
                JsonResponse::server_error("Failed to resolve permalink").into_response()
            }
        },
        Permalink::Rdf { format, body } => {
            ([(CONTENT_TYPE, format.media_type())], body).into_response()
        }
        Permalink::File {
            path,
            content_type,
            file_name,
            disposition,
        } => {
            let file = match tokio::fs::File::open(&path).await {
                Ok(file) => file,
                Err(err) => {
                    error!(path = %path.display(), error = %err, "failed to open permalink file");
                    return JsonResponse::server_error("Failed to read file").into_response();
                }
            };
            let disposition = match disposition {
                Disposition::Inline => format!("inline; filename=\"{file_name}\""),
                Disposition::Attachment => format!("attachment; filename={file_name};"),
            };
            (
                [(CONTENT_TYPE, content_type.to_string()), (CONTENT_DISPOSITION, disposition)],
                Body::from_stream(ReaderStream::new(file)),
            )
                .into_response()
        }
    }
}
