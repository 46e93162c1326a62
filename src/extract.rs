use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
}

/// Deserializes an urlencoded form body or, for any other content type, a
/// JSON body. An empty JSON body is read as `{}`.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T> {
    pub kind: BodyKind,
    pub value: T,
}

impl<T> JsonOrForm<T> {
    pub fn is_form(&self) -> bool {
        self.kind == BodyKind::Form
    }
}

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::Validation("Unable to read request body".to_string()))?;

        if is_form {
            let value = serde_urlencoded::from_bytes(&bytes)
                .map_err(|e| AppError::Validation(format!("Invalid form body: {}", e)))?;
            return Ok(JsonOrForm {
                kind: BodyKind::Form,
                value,
            });
        }

        let raw: &[u8] = if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            b"{}"
        } else {
            &bytes
        };
        let value = serde_json::from_slice(raw)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))?;

        Ok(JsonOrForm {
            kind: BodyKind::Json,
            value,
        })
    }
}
