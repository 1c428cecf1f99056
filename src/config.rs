//! Validated client configuration: backend endpoints, CSRF policy, and timeouts.

// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	store::{DEFAULT_STATE_KEY, DEFAULT_STATE_TTL},
};

/// Backend base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default bound on every backend request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);

const ENV_BASE_URL: &str = "OAUTH2_SESSION_BASE_URL";
const ENV_ENFORCE_STATE: &str = "OAUTH2_SESSION_ENFORCE_STATE";

/// How the callback reconciler treats the CSRF `state` parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsrfPolicy {
	/// A state token must be issued at login and must match on callback.
	#[default]
	Enforce,
	/// The backend validates state itself; the client only checks a token it actually stored.
	BackendManaged,
}

/// Absolute backend endpoint URLs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEndpoints {
	/// `GET` endpoint returning the provider authorization URL.
	pub login: Url,
	/// `GET` endpoint returning the current user.
	pub me: Url,
	/// `POST` endpoint terminating the session.
	pub logout: Url,
	/// `POST` endpoint exchanging the authorization code.
	pub callback: Url,
}

/// Immutable configuration consumed by the session manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
	/// Backend origin every endpoint resolves against.
	pub base_url: Url,
	/// Resolved endpoint URLs.
	pub endpoints: SessionEndpoints,
	/// CSRF state policy.
	pub csrf_policy: CsrfPolicy,
	/// Lifetime of a pending state token.
	pub state_ttl: Duration,
	/// Bound applied to every backend request.
	pub request_timeout: Duration,
	/// Storage key holding the pending state token.
	pub state_key: String,
}
impl SessionConfig {
	/// Creates a new builder for the provided backend base URL.
	pub fn builder(base_url: Url) -> SessionConfigBuilder {
		SessionConfigBuilder::new(base_url)
	}

	/// Builds a configuration from `OAUTH2_SESSION_BASE_URL` (default
	/// [`DEFAULT_BASE_URL`]) and `OAUTH2_SESSION_ENFORCE_STATE` (default `true`).
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Same as [`SessionConfig::from_env`] with a caller-supplied variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let raw_base = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.into());
		let base_url =
			Url::parse(raw_base.trim()).map_err(|source| ConfigError::InvalidBaseUrl { source })?;
		let csrf_policy = match lookup(ENV_ENFORCE_STATE) {
			None => CsrfPolicy::Enforce,
			Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
				"1" | "true" | "yes" | "on" => CsrfPolicy::Enforce,
				"0" | "false" | "no" | "off" => CsrfPolicy::BackendManaged,
				_ => return Err(ConfigError::InvalidEnv { name: ENV_ENFORCE_STATE, value: raw }),
			},
		};

		Self::builder(base_url).csrf_policy(csrf_policy).build()
	}
}

/// Builder for [`SessionConfig`] values.
#[derive(Debug)]
pub struct SessionConfigBuilder {
	/// Backend base URL.
	pub base_url: Url,
	/// Path of the login endpoint.
	pub login_path: String,
	/// Path of the current-user endpoint.
	pub me_path: String,
	/// Path of the logout endpoint.
	pub logout_path: String,
	/// Path of the code exchange endpoint.
	pub callback_path: String,
	/// CSRF state policy.
	pub csrf_policy: CsrfPolicy,
	/// Lifetime of a pending state token.
	pub state_ttl: Duration,
	/// Bound applied to every backend request.
	pub request_timeout: Duration,
	/// Storage key holding the pending state token.
	pub state_key: String,
}
impl SessionConfigBuilder {
	/// Creates a new builder seeded with the backend's default routes.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			login_path: "/auth/login".into(),
			me_path: "/auth/me".into(),
			logout_path: "/auth/logout".into(),
			callback_path: "/auth/callback".into(),
			csrf_policy: CsrfPolicy::default(),
			state_ttl: DEFAULT_STATE_TTL,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			state_key: DEFAULT_STATE_KEY.into(),
		}
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the current-user endpoint path.
	pub fn me_path(mut self, path: impl Into<String>) -> Self {
		self.me_path = path.into();

		self
	}

	/// Overrides the logout endpoint path.
	pub fn logout_path(mut self, path: impl Into<String>) -> Self {
		self.logout_path = path.into();

		self
	}

	/// Overrides the code exchange endpoint path.
	pub fn callback_path(mut self, path: impl Into<String>) -> Self {
		self.callback_path = path.into();

		self
	}

	/// Overrides the CSRF state policy.
	pub fn csrf_policy(mut self, policy: CsrfPolicy) -> Self {
		self.csrf_policy = policy;

		self
	}

	/// Overrides the pending state lifetime (defaults to 10 minutes).
	pub fn state_ttl(mut self, ttl: Duration) -> Self {
		self.state_ttl = ttl;

		self
	}

	/// Overrides the request timeout (defaults to 30 seconds).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the storage key of the pending state token.
	pub fn state_key(mut self, key: impl Into<String>) -> Self {
		self.state_key = key.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<SessionConfig, ConfigError> {
		validate_base_url(&self.base_url)?;

		if !self.state_ttl.is_positive() {
			return Err(ConfigError::NonPositiveStateTtl);
		}
		if !self.request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout);
		}
		if self.state_key.trim().is_empty() {
			return Err(ConfigError::EmptyStateKey);
		}

		let endpoints = SessionEndpoints {
			login: resolve_endpoint(&self.base_url, "login", &self.login_path)?,
			me: resolve_endpoint(&self.base_url, "me", &self.me_path)?,
			logout: resolve_endpoint(&self.base_url, "logout", &self.logout_path)?,
			callback: resolve_endpoint(&self.base_url, "callback", &self.callback_path)?,
		};

		Ok(SessionConfig {
			base_url: self.base_url,
			endpoints,
			csrf_policy: self.csrf_policy,
			state_ttl: self.state_ttl,
			request_timeout: self.request_timeout,
			state_key: self.state_key,
		})
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ConfigError::InsecureBaseUrl { url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}

fn resolve_endpoint(base: &Url, endpoint: &'static str, path: &str) -> Result<Url, ConfigError> {
	let url = base.join(path).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })?;

	if url.origin() != base.origin() {
		return Err(ConfigError::ForeignEndpoint { endpoint, url: url.to_string() });
	}

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	#[test]
	fn defaults_resolve_backend_routes() {
		let config = SessionConfig::builder(url("https://api.example.com"))
			.build()
			.expect("Default configuration should build.");

		assert_eq!(config.endpoints.login.as_str(), "https://api.example.com/auth/login");
		assert_eq!(config.endpoints.me.as_str(), "https://api.example.com/auth/me");
		assert_eq!(config.endpoints.logout.as_str(), "https://api.example.com/auth/logout");
		assert_eq!(config.endpoints.callback.as_str(), "https://api.example.com/auth/callback");
		assert_eq!(config.csrf_policy, CsrfPolicy::Enforce);
		assert_eq!(config.state_ttl, Duration::minutes(10));
		assert_eq!(config.request_timeout, Duration::seconds(30));
	}

	#[test]
	fn plain_http_is_limited_to_loopback() {
		for base in ["http://localhost:8000", "http://127.0.0.1:9", "http://[::1]:8080"] {
			SessionConfig::builder(url(base)).build().expect("Loopback HTTP should be accepted.");
		}

		let err = SessionConfig::builder(url("http://api.example.com"))
			.build()
			.expect_err("Remote plain HTTP should be rejected.");

		assert!(matches!(err, ConfigError::InsecureBaseUrl { .. }));
	}

	#[test]
	fn rejects_foreign_endpoints_and_bad_durations() {
		let err = SessionConfig::builder(url("https://api.example.com"))
			.me_path("https://evil.example.net/auth/me")
			.build()
			.expect_err("Cross-origin endpoints should be rejected.");

		assert!(matches!(err, ConfigError::ForeignEndpoint { endpoint: "me", .. }));

		let err = SessionConfig::builder(url("https://api.example.com"))
			.state_ttl(Duration::ZERO)
			.build()
			.expect_err("Zero TTL should be rejected.");

		assert!(matches!(err, ConfigError::NonPositiveStateTtl));

		let err = SessionConfig::builder(url("https://api.example.com"))
			.request_timeout(Duration::seconds(-1))
			.build()
			.expect_err("Negative timeouts should be rejected.");

		assert!(matches!(err, ConfigError::NonPositiveTimeout));
	}

	#[test]
	fn lookup_reads_base_url_and_policy() {
		let config = SessionConfig::from_lookup(|name| match name {
			ENV_BASE_URL => Some("https://backend.example.com/".into()),
			ENV_ENFORCE_STATE => Some("false".into()),
			_ => None,
		})
		.expect("Lookup configuration should build.");

		assert_eq!(config.endpoints.me.as_str(), "https://backend.example.com/auth/me");
		assert_eq!(config.csrf_policy, CsrfPolicy::BackendManaged);

		let defaults = SessionConfig::from_lookup(|_| None).expect("Defaults should build.");

		assert_eq!(defaults.base_url.as_str(), "http://localhost:8000/");

		let err = SessionConfig::from_lookup(|name| {
			(name == ENV_ENFORCE_STATE).then(|| "sometimes".to_owned())
		})
		.expect_err("Unknown boolean values should be rejected.");

		assert!(matches!(err, ConfigError::InvalidEnv { .. }));
	}
}
