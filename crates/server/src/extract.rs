use api_types::MessageResponse;
use axum::Json;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// JSON body extractor that answers malformed payloads with 422 and the
/// standard error envelope instead of axum's plain-text rejection.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(BodyRejection))]
pub struct Body<T>(pub T);

pub struct BodyRejection(JsonRejection);

impl From<JsonRejection> for BodyRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection)
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(MessageResponse {
                message: self.0.body_text(),
                success: false,
            }),
        )
            .into_response()
    }
}
