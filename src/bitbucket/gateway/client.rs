//! Reqwest client construction and shared request plumbing.

use std::time::Duration;

use http::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::bitbucket::error::BitbucketError;
use crate::bitbucket::locator::Credentials;

use super::error_mapping::{map_decode_error, map_http_error, map_transport_error};

/// Bitbucket Cloud REST client.
///
/// Every method issues exactly one HTTP request. Collection endpoints have
/// their `{ "values": [...] }` envelope unwrapped; non-success statuses are
/// surfaced as [`BitbucketError::Authentication`] or [`BitbucketError::Api`]
/// with the remote message attached.
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    http: Client,
    base_url: Url,
    credentials: Credentials,
}

/// Query string pairs attached to a request.
pub(super) type Query<'a> = [(&'a str, String)];

impl BitbucketClient {
    /// Builds a client for `base_url` using `credentials` on every request.
    ///
    /// # Errors
    ///
    /// Returns [`BitbucketError::Configuration`] when the base URL cannot be
    /// parsed or cannot carry path segments, or when the HTTP client cannot
    /// be constructed.
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, BitbucketError> {
        let parsed = Url::parse(base_url).map_err(|error| {
            BitbucketError::configuration(format!("invalid Bitbucket URL '{base_url}': {error}"))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(BitbucketError::configuration(format!(
                "Bitbucket URL '{base_url}' cannot be used as an API base"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|error| {
                BitbucketError::configuration(format!("failed to configure HTTP client: {error}"))
            })?;

        Ok(Self {
            http,
            base_url: parsed,
            credentials,
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BitbucketError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BitbucketError::configuration(format!(
                    "Bitbucket URL '{}' cannot be used as an API base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Credentials::Bearer { token } => builder.bearer_auth(token),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        }
    }

    async fn execute(
        &self,
        operation: &str,
        builder: RequestBuilder,
    ) -> Result<Response, BitbucketError> {
        tracing::debug!(operation, "sending Bitbucket request");
        let response = builder
            .send()
            .await
            .map_err(|error| map_transport_error(operation, &error))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(failed to read error response body)"));
        tracing::debug!(operation, status = status.as_u16(), "Bitbucket request failed");
        Err(map_http_error(operation, status, &body))
    }

    async fn read_json(operation: &str, response: Response) -> Result<Value, BitbucketError> {
        let body = response
            .text()
            .await
            .map_err(|error| map_transport_error(operation, &error))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|error| map_decode_error(operation, &error))
    }

    /// `GET` returning a parsed JSON document.
    pub(super) async fn get_json(
        &self,
        operation: &str,
        segments: &[&str],
        query: &Query<'_>,
    ) -> Result<Value, BitbucketError> {
        let url = self.endpoint(segments)?;
        let response = self
            .execute(operation, self.request(Method::GET, url).query(query))
            .await?;
        Self::read_json(operation, response).await
    }

    /// `GET` on a collection endpoint, unwrapping its `values` array.
    pub(super) async fn get_values(
        &self,
        operation: &str,
        segments: &[&str],
        query: &Query<'_>,
    ) -> Result<Vec<Value>, BitbucketError> {
        let document = self.get_json(operation, segments, query).await?;
        unwrap_values(operation, document)
    }

    /// `GET` returning the body as plain text.
    pub(super) async fn get_text(
        &self,
        operation: &str,
        segments: &[&str],
    ) -> Result<String, BitbucketError> {
        let url = self.endpoint(segments)?;
        let builder = self
            .request(Method::GET, url)
            .header(ACCEPT, HeaderValue::from_static("text/plain"));
        let response = self.execute(operation, builder).await?;
        response
            .text()
            .await
            .map_err(|error| map_transport_error(operation, &error))
    }

    /// Sends `body` (when present) as JSON and parses the JSON response.
    pub(super) async fn send_json<B>(
        &self,
        operation: &str,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Value, BitbucketError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let mut builder = self.request(method, url);
        if let Some(payload) = body {
            builder = builder.json(payload);
        }
        let response = self.execute(operation, builder).await?;
        Self::read_json(operation, response).await
    }

    /// Sends a request whose response body is ignored.
    pub(super) async fn send_empty(
        &self,
        operation: &str,
        method: Method,
        segments: &[&str],
    ) -> Result<(), BitbucketError> {
        let url = self.endpoint(segments)?;
        self.execute(operation, self.request(method, url))
            .await
            .map(drop)
    }
}

/// Unwraps the `{ "values": [...] }` collection envelope.
///
/// A missing or `null` `values` key yields an empty list; any other
/// non-array shape is a decoding failure.
pub(super) fn unwrap_values(operation: &str, document: Value) -> Result<Vec<Value>, BitbucketError> {
    match document {
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => match map.remove("values") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(values)) => Ok(values),
            Some(_) => Err(BitbucketError::Decode {
                message: format!("{operation} returned a non-array 'values' field"),
            }),
        },
        _ => Err(BitbucketError::Decode {
            message: format!("{operation} returned a non-object collection response"),
        }),
    }
}
