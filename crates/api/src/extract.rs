//! Request extractors that keep rejections on the error contract.
//!
//! Axum's stock extractors answer malformed input with plain-text
//! rejections (422 for JSON bodies). Every error leaving this service is
//! `{"error": <message>}` JSON, so these wrappers route extraction
//! failures through [`ApiError`], which renders them as 400s.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `axum::Json` with the rejection mapped onto [`ApiError::Value`].
#[derive(Debug)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Value(rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// `axum::extract::Query` with the rejection mapped onto [`ApiError::Value`].
#[derive(Debug)]
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| ApiError::Value(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `axum::extract::Path` with the rejection mapped onto [`ApiError::Value`].
#[derive(Debug)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| ApiError::Value(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode, header};
    use serde_json::Value;

    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct NamePayload {
        name: String,
    }

    #[derive(Debug, serde::Deserialize)]
    struct ItemQuery {
        #[allow(dead_code)]
        product_id: Option<i32>,
        #[allow(dead_code)]
        quantity: Option<i32>,
    }

    async fn error_response(err: ApiError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_json_body_extracts() {
        let req = HttpRequest::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"ok"}"#))
            .unwrap();

        let Json(payload) = Json::<NamePayload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.name, "ok");
    }

    #[tokio::test]
    async fn test_wrong_typed_json_field_answers_error_json() {
        let req = HttpRequest::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":5}"#))
            .unwrap();

        let err = Json::<NamePayload>::from_request(req, &())
            .await
            .unwrap_err();

        let (status, body) = error_response(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn test_malformed_json_body_answers_error_json() {
        let req = HttpRequest::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let err = Json::<NamePayload>::from_request(req, &())
            .await
            .unwrap_err();

        let (status, body) = error_response(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_non_numeric_query_param_answers_error_json() {
        let (mut parts, ()) = HttpRequest::builder()
            .uri("/orders/1/add-product?product_id=abc&quantity=2")
            .body(())
            .unwrap()
            .into_parts();

        let err = Query::<ItemQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        let (status, body) = error_response(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("product_id"));
    }
}
