//! HTTP rendering of [`AppError`] (`axum` feature)
//!
//! Body is always `{"error": <message>}`; a retry hint becomes a
//! `Retry-After` header.

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for super::app_error::AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::{HeaderValue, StatusCode, header};

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(serde_json::json!({ "error": self.message() }));
        let mut response = (status, body).into_response();

        if let Some(secs) = self.retry_after_secs() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use crate::error::{app_error::AppError, kind::ErrorKind};
    use axum::response::IntoResponse;

    async fn body_of(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limit_response() {
        let response = AppError::new(
            ErrorKind::TooManyRequests,
            "Rate limit exceeded. Please try again later.",
        )
        .with_retry_after(60)
        .into_response();

        assert_eq!(response.status(), 429);
        assert_eq!(response.headers()["retry-after"], "60");
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(
            body_of(response).await,
            serde_json::json!({ "error": "Rate limit exceeded. Please try again later." })
        );
    }

    #[tokio::test]
    async fn test_no_retry_after_by_default() {
        let response =
            AppError::new(ErrorKind::Forbidden, "Unable to access the AI service.").into_response();

        assert_eq!(response.status(), 403);
        assert!(response.headers().get("retry-after").is_none());
    }
}
