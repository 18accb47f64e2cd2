// =============================================================================
// Larder Backend - Error Types
// =============================================================================

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::store::StoreError;

/// Request-level failure. Anything that reaches here is not recoverable by the user.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Store(e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong while talking to the database. Nothing was saved.",
                )
            }
        };

        let body = Html(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Larder - Error</title></head>
<body>
    <h1>{}</h1>
    <p>{}</p>
    <p><a href="/">Back to the fridge</a></p>
</body>
</html>"#,
            status.as_u16(),
            message
        ));

        (status, body).into_response()
    }
}
