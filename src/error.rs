//! Session-level error types shared across the manager, reconciler, stores, and transports.

// self
use crate::_prelude::*;

/// Session-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

const PROVIDER_DENIED_FALLBACK: &str =
	"The identity provider cancelled or denied the authorization request";

/// Canonical error recorded by the session manager and returned from its operations.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// CSRF state storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),

	/// Backend did not hand out a usable authorization URL, or the hand-off failed.
	#[error("Login could not be initiated: {reason}.")]
	LoginInitiation {
		/// Human-readable failure summary.
		reason: String,
		/// Underlying failure, when one exists.
		#[source]
		source: Option<BoxError>,
	},
	/// Identity provider redirected back with an `error` parameter.
	#[error("{}", provider_denied_message(.error, .description))]
	ProviderDenied {
		/// Provider `error` code (e.g. `access_denied`).
		error: String,
		/// Provider `error_description`, when supplied.
		description: Option<String>,
	},
	/// Redirect is missing the authorization code or state.
	#[error("Callback is malformed: {reason}.")]
	MalformedCallback {
		/// Missing or invalid component.
		reason: &'static str,
	},
	/// Returned `state` does not match the stored token.
	#[error("Callback failed CSRF validation: {0}.")]
	CsrfValidation(CsrfFailure),
	/// Backend rejected the authorization code exchange.
	#[error("Authorization code exchange failed: {0}")]
	CallbackExchange(#[source] RequestError),
	/// Current-user lookup failed for a reason other than "not authenticated".
	#[error("Session refresh failed: {0}")]
	SessionRefresh(#[source] RequestError),
	/// Backend could not terminate the session.
	#[error("Logout failed: {0}")]
	Logout(#[source] RequestError),
}
impl Error {
	/// Builds a [`Error::LoginInitiation`] without an underlying cause.
	pub fn login_initiation(reason: impl Into<String>) -> Self {
		Self::LoginInitiation { reason: reason.into(), source: None }
	}

	/// Builds a [`Error::LoginInitiation`] that wraps `src`.
	pub fn login_initiation_caused_by(
		reason: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::LoginInitiation { reason: reason.into(), source: Some(Box::new(src)) }
	}
}

fn provider_denied_message(error: &str, description: &Option<String>) -> String {
	match description.as_deref().map(str::trim) {
		Some(description) if !description.is_empty() => description.to_owned(),
		_ => format!("{PROVIDER_DENIED_FALLBACK} ({error})."),
	}
}

/// Reason a callback failed CSRF validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CsrfFailure {
	/// No state token was stored for this client.
	Missing,
	/// The returned state differs from the stored token.
	Mismatch,
	/// The stored token outlived its time-to-live.
	Expired,
}
impl CsrfFailure {
	/// Short machine-readable label (`missing`, `mismatch`, `expired`).
	pub const fn label(self) -> &'static str {
		match self {
			CsrfFailure::Missing => "missing",
			CsrfFailure::Mismatch => "mismatch",
			CsrfFailure::Expired => "expired",
		}
	}

	/// Human-readable description used in error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			CsrfFailure::Missing => "no login attempt is pending",
			CsrfFailure::Mismatch => "state does not match the pending login attempt",
			CsrfFailure::Expired => "the pending login attempt has expired",
		}
	}
}
impl Display for CsrfFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Backend base URL cannot be parsed.
	#[error("Backend base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Backend base URL uses plain HTTP against a non-loopback host.
	#[error("The backend base URL must use HTTPS unless it targets a loopback host: {url}.")]
	InsecureBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Endpoint path cannot be resolved against the base URL.
	#[error("The {endpoint} endpoint path is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint resolves to a different origin than the base URL.
	#[error("The {endpoint} endpoint must share the backend origin: {url}.")]
	ForeignEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Resolved endpoint URL.
		url: String,
	},
	/// CSRF state lifetime must be positive.
	#[error("The state time-to-live must be positive.")]
	NonPositiveStateTtl,
	/// Request timeout must be positive.
	#[error("The request timeout must be positive.")]
	NonPositiveTimeout,
	/// Storage key for the CSRF token is empty.
	#[error("The CSRF state storage key cannot be empty.")]
	EmptyStateKey,
	/// Environment variable holds an unusable value.
	#[error("Environment variable {name} has an invalid value: {value}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Raw value.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Uniform failure shape produced by the HTTP Client Adapter.
///
/// [`RequestError::Transport`] means no response was received at all, while
/// [`RequestError::Status`] carries the error status the backend actually returned.
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// No response was received.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Backend answered with a non-success status.
	#[error("backend responded with HTTP {status}: {message}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Message extracted from the response body or the canonical reason phrase.
		message: String,
	},
	/// Backend answered with a success status but an unparsable body.
	#[error("backend returned a malformed response body.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
}
impl RequestError {
	/// HTTP status code, when a response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Transport(_) => None,
			Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
		}
	}

	/// Whether the backend signalled 401; callers decide what that means.
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(401)
	}

	/// Whether the request failed before any response arrived.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport(_))
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("network error occurred while calling the backend")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provider_denied_prefers_description() {
		let err = Error::ProviderDenied {
			error: "access_denied".into(),
			description: Some("The user has denied your application access.".into()),
		};

		assert_eq!(err.to_string(), "The user has denied your application access.");

		let err = Error::ProviderDenied { error: "access_denied".into(), description: None };

		assert!(err.to_string().contains("access_denied"));

		let err =
			Error::ProviderDenied { error: "access_denied".into(), description: Some("  ".into()) };

		assert!(err.to_string().starts_with(PROVIDER_DENIED_FALLBACK));
	}

	#[test]
	fn request_error_distinguishes_transport_and_status() {
		let network = RequestError::from(TransportError::Io(std::io::Error::other("reset")));

		assert!(network.is_transport());
		assert_eq!(network.status(), None);
		assert!(!network.is_unauthorized());

		let unauthorized =
			RequestError::Status { status: 401, message: "Not authenticated".into() };

		assert!(!unauthorized.is_transport());
		assert!(unauthorized.is_unauthorized());
		assert_eq!(
			Error::SessionRefresh(unauthorized).to_string(),
			"Session refresh failed: backend responded with HTTP 401: Not authenticated."
		);
	}

	#[test]
	fn csrf_failure_messages_are_human_readable() {
		let err = Error::CsrfValidation(CsrfFailure::Mismatch);

		assert_eq!(
			err.to_string(),
			"Callback failed CSRF validation: state does not match the pending login attempt."
		);
	}
}
