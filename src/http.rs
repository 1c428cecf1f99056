//! HTTP Client Adapter primitives for credentialed backend calls.
//!
//! The module exposes [`BackendHttpClient`] alongside [`BackendRequest`] and
//! [`BackendResponse`] so downstream crates can plug in their own HTTP stack (or an in-memory
//! fake) without losing the manager's status classification. Implementations only move bytes:
//! they report [`TransportError`] when no response arrived and otherwise hand back the status
//! and body untouched. A 401 is never acted upon here; the session manager decides whether it
//! means "not logged in" or "session expired".

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::http::StatusCode;
use serde::de::DeserializeOwned;
#[cfg(feature = "reqwest")]
use reqwest::header::{ACCEPT, CONTENT_TYPE};
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{
	_prelude::*,
	error::{RequestError, TransportError},
};

/// Boxed future returned by [`BackendHttpClient::execute`].
pub type BackendFuture<'a> =
	Pin<Box<dyn Future<Output = Result<BackendResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports that carry the session cookie to the backend.
///
/// Implementations must attach whatever credentials identify the browser/client session
/// (typically a cookie jar) to every request; the session manager never stores tokens itself.
pub trait BackendHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Dispatches `request` and resolves once the full response body has been read.
	fn execute(&self, request: BackendRequest) -> BackendFuture<'_>;
}

/// HTTP verbs used by the backend contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendMethod {
	/// `GET`
	Get,
	/// `POST`
	Post,
}
impl BackendMethod {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			BackendMethod::Get => "GET",
			BackendMethod::Post => "POST",
		}
	}
}
impl Display for BackendMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound backend request.
#[derive(Clone, Debug)]
pub struct BackendRequest {
	/// HTTP method.
	pub method: BackendMethod,
	/// Absolute endpoint URL.
	pub url: Url,
	/// Optional JSON payload.
	pub json: Option<serde_json::Value>,
}
impl BackendRequest {
	/// Creates a `GET` request.
	pub fn get(url: Url) -> Self {
		Self { method: BackendMethod::Get, url, json: None }
	}

	/// Creates a `POST` request without a body.
	pub fn post(url: Url) -> Self {
		Self { method: BackendMethod::Post, url, json: None }
	}

	/// Attaches a JSON payload.
	pub fn with_json(mut self, body: serde_json::Value) -> Self {
		self.json = Some(body);

		self
	}
}

/// Raw backend response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl BackendResponse {
	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Converts non-2xx responses into [`RequestError::Status`].
	pub fn error_for_status(self) -> Result<Self, RequestError> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(RequestError::Status { status: self.status, message: self.error_message() })
		}
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn decode<T>(&self) -> Result<T, RequestError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| RequestError::Decode { source, status: self.status })
	}

	/// Extracts a human-readable message from an error body.
	///
	/// Looks for a string `detail` or `message` field and falls back to the status reason.
	pub fn error_message(&self) -> String {
		let from_body = serde_json::from_slice::<serde_json::Value>(&self.body).ok().and_then(
			|value| {
				["detail", "message"]
					.iter()
					.find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_owned))
			},
		);

		from_body
			.or_else(|| {
				StatusCode::from_u16(self.status)
					.ok()
					.and_then(|code| code.canonical_reason())
					.map(str::to_owned)
			})
			.unwrap_or_else(|| "Unexpected response".into())
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Use [`ReqwestHttpClient::credentialed`] for the default stack: a cookie jar keeps the
/// backend's session cookie across calls and every request is bounded by a timeout. A custom
/// client passed to [`ReqwestHttpClient::with_client`] must enable its own cookie store.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a cookie-carrying client whose requests time out after `timeout`.
	pub fn credentialed(timeout: Duration) -> Result<Self, ConfigError> {
		let timeout =
			std::time::Duration::try_from(timeout).map_err(|_| ConfigError::NonPositiveTimeout)?;
		let client = ReqwestClient::builder().cookie_store(true).timeout(timeout).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl BackendHttpClient for ReqwestHttpClient {
	fn execute(&self, request: BackendRequest) -> BackendFuture<'_> {
		Box::pin(async move {
			let BackendRequest { method, url, json } = request;
			let mut builder = match method {
				BackendMethod::Get => self.0.get(url),
				BackendMethod::Post => self.0.post(url),
			}
			.header(ACCEPT, "application/json");

			if let Some(body) = json {
				let bytes = serde_json::to_vec(&body).map_err(std::io::Error::from)?;

				builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(BackendResponse { status, body })
		})
	}
}
