//! Parameters the identity provider appends to the callback redirect.

// crates.io
use oauth2::{AuthorizationCode, CsrfToken};
// self
use crate::_prelude::*;

/// Redirect parameters parsed once from the callback URL; never persisted.
///
/// Empty values are treated as absent.
#[derive(Clone, Debug, Default)]
pub struct CallbackParams {
	/// Authorization code to exchange.
	pub code: Option<AuthorizationCode>,
	/// State echoed back by the provider.
	pub state: Option<CsrfToken>,
	/// Provider `error` code (e.g. `access_denied`).
	pub error: Option<String>,
	/// Provider `error_description`.
	pub error_description: Option<String>,
}
impl CallbackParams {
	/// Builds parameters for a successful redirect carrying `code` and `state`.
	pub fn new(code: impl Into<String>, state: impl Into<String>) -> Self {
		Self {
			code: non_empty(code.into()).map(AuthorizationCode::new),
			state: non_empty(state.into()).map(CsrfToken::new),
			..Default::default()
		}
	}

	/// Builds parameters for a redirect carrying a provider error.
	pub fn denied(error: impl Into<String>, description: Option<String>) -> Self {
		Self {
			error: non_empty(error.into()),
			error_description: description.and_then(non_empty),
			..Default::default()
		}
	}

	/// Parses the query component of a full callback URL.
	pub fn from_url(url: &Url) -> Self {
		Self::from_pairs(url.query_pairs())
	}

	/// Parses a raw (optionally `?`-prefixed) query string.
	pub fn from_query(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);

		Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
	}

	/// Whether the provider reported an error instead of issuing a code.
	pub fn is_denied(&self) -> bool {
		self.error.is_some()
	}

	fn from_pairs<'a, I>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
	{
		let mut params = Self::default();

		for (key, value) in pairs {
			let Some(value) = non_empty(value.into_owned()) else { continue };

			match key.as_ref() {
				"code" if params.code.is_none() =>
					params.code = Some(AuthorizationCode::new(value)),
				"state" if params.state.is_none() => params.state = Some(CsrfToken::new(value)),
				"error" if params.error.is_none() => params.error = Some(value),
				"error_description" if params.error_description.is_none() =>
					params.error_description = Some(value),
				_ => {},
			}
		}

		params
	}
}

fn non_empty(value: String) -> Option<String> {
	if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_success_redirect() {
		let url = Url::parse("https://app.example.com/auth/callback?code=xyz&state=abc123")
			.expect("Callback URL fixture should parse.");
		let params = CallbackParams::from_url(&url);

		assert_eq!(params.code.as_ref().map(|code| code.secret().as_str()), Some("xyz"));
		assert_eq!(params.state.as_ref().map(|state| state.secret().as_str()), Some("abc123"));
		assert!(!params.is_denied());
	}

	#[test]
	fn parses_denied_redirect() {
		let params = CallbackParams::from_query(
			"?error=access_denied&error_description=The+user+has+denied+your+application+access.&state=abc",
		);

		assert_eq!(params.error.as_deref(), Some("access_denied"));
		assert_eq!(
			params.error_description.as_deref(),
			Some("The user has denied your application access.")
		);
		assert!(params.code.is_none());
		assert!(params.is_denied());
	}

	#[test]
	fn empty_values_and_duplicates() {
		let params = CallbackParams::from_query("code=&state=first&state=second");

		assert!(params.code.is_none());
		assert_eq!(params.state.as_ref().map(|state| state.secret().as_str()), Some("first"));
		assert!(CallbackParams::new("", "s").code.is_none());
	}
}
