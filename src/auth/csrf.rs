//! CSRF state helpers: digest comparison and state extraction from authorization URLs.

// crates.io
use oauth2::CsrfToken;
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const STATE_PARAM: &str = "state";

/// Returns `true` when `received` carries exactly the same secret as `expected`.
///
/// Both values are hashed before comparison so the check does not short-circuit on the first
/// differing byte of the secret itself.
pub fn state_matches(expected: &CsrfToken, received: &CsrfToken) -> bool {
	let expected = Sha256::digest(expected.secret().as_bytes());
	let received = Sha256::digest(received.secret().as_bytes());

	expected.iter().zip(received.iter()).fold(0_u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Extracts the `state` query parameter embedded in a provider authorization URL.
pub fn state_from_authorize_url(url: &Url) -> Option<CsrfToken> {
	url.query_pairs()
		.find(|(key, _)| key == STATE_PARAM)
		.map(|(_, value)| value.into_owned())
		.filter(|value| !value.is_empty())
		.map(CsrfToken::new)
}
