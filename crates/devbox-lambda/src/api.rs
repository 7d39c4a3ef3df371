//! Typed request pipeline
//!
//! Every client method goes through [`Session::execute`]. It sends one
//! request and resolves it to exactly one of: the decoded success payload,
//! the matching variant of the endpoint's error union, a raw status error,
//! a response shape error, or a transport failure. It never retries.

use crate::error::{ApiError, ErrorUnion};
use reqwest::{Method, StatusCode, header};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Field that wraps success payloads
pub const ENVELOPE_FIELD: &str = "data";

/// Raw body kept on unrecognized error responses
pub const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Deserialize)]
struct ErrorEnvelope<E> {
    error: E,
}

/// Authenticated HTTP session against one API base URL
pub(crate) struct Session {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Session {
    pub(crate) fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("devbox/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET without a body
    pub(crate) async fn get<T, E>(&self, path: &str) -> Result<T, ApiError<E>>
    where
        T: DeserializeOwned,
        E: ErrorUnion,
    {
        self.execute::<T, E, ()>(Method::GET, path, None).await
    }

    /// POST with a JSON body
    pub(crate) async fn post<T, E, B>(&self, path: &str, body: &B) -> Result<T, ApiError<E>>
    where
        T: DeserializeOwned,
        E: ErrorUnion,
        B: Serialize + ?Sized,
    {
        self.execute::<T, E, B>(Method::POST, path, Some(body)).await
    }

    /// PATCH with a JSON body
    pub(crate) async fn patch<T, E, B>(&self, path: &str, body: &B) -> Result<T, ApiError<E>>
    where
        T: DeserializeOwned,
        E: ErrorUnion,
        B: Serialize + ?Sized,
    {
        self.execute::<T, E, B>(Method::PATCH, path, Some(body)).await
    }

    pub(crate) async fn execute<T, E, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError<E>>
    where
        T: DeserializeOwned,
        E: ErrorUnion,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .basic_auth(&self.api_key, Some(""))
            .header(header::ACCEPT, "application/json");

        if let Some(body) = body {
            // sets Content-Type: application/json
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(%method, path, status = status.as_u16(), "Lambda Cloud API call");

        if !status.is_success() {
            return Err(decode_error(method, path, status, &text));
        }

        decode_success(&text).map_err(|source| ApiError::ResponseShape {
            method,
            path: path.to_string(),
            source,
        })
    }
}

/// Decode a success body, unwrapping the `data` envelope when present
pub(crate) fn decode_success<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    let value: Value = serde_json::from_str(text)?;

    let payload = match value {
        Value::Object(mut map) => match map.remove(ENVELOPE_FIELD) {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    };

    T::deserialize(payload)
}

/// Decode a failed response against the endpoint's error union
pub(crate) fn decode_error<E: ErrorUnion>(
    method: Method,
    path: &str,
    status: StatusCode,
    text: &str,
) -> ApiError<E> {
    match serde_json::from_str::<ErrorEnvelope<E>>(text) {
        Ok(envelope) => ApiError::Api(envelope.error),
        Err(e) => {
            tracing::debug!(error = %e, "error body did not match the endpoint error union");
            ApiError::Status {
                method,
                path: path.to_string(),
                status,
                body: truncate_chars(text, MAX_ERROR_BODY_CHARS),
            }
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
