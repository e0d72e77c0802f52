use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Closed set of failure kinds for the OG endpoint.
///
/// `Upstream` never surfaces on its own: failures in non-essential enrichment
/// (balance, reverse lookup, avatar probe) are logged by the caller and a safe
/// default is substituted.
#[derive(Debug)]
pub enum AppError {
    BadRequest(&'static str),
    NotFound(&'static str),
    Upstream(anyhow::Error),
    Render(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            Self::Upstream(err) | Self::Render(err) => {
                tracing::error!("{:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate the image")
                    .into_response()
            }
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self { Self::Render(err.into()) }
}
