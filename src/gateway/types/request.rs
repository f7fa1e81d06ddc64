//! Request body extraction
//!
//! Bodies that fail to deserialize are answered with the `{code, msg, data}`
//! envelope at 400 instead of axum's plain-text rejection.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use super::response::ApiError;

/// JSON body extractor whose rejection is an [`ApiError`]
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(malformed_body)?;
        Ok(ApiJson(body))
    }
}

fn malformed_body(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(format!("Invalid JSON: {}", rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        id: uuid::Uuid,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_well_formed_body() {
        let id = uuid::Uuid::new_v4();
        let req = json_request(&format!(r#"{{"id": "{}"}}"#, id));
        assert!(ApiJson::<Payload>::from_request(req, &()).await.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_field_is_bad_request() {
        let req = json_request(r#"{"id": "not-a-uuid"}"#);
        let err = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail.error, "INVALID_PARAMETER");
        assert!(err.msg.starts_with("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("{}"))
            .unwrap();
        let err = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
