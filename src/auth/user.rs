//! Authenticated identity returned by the backend's current-user endpoint.

// crates.io
use serde::Deserializer;
// self
use crate::_prelude::*;

/// Identity of the signed-in user as reported by the backend.
///
/// Values are immutable once fetched; every refresh replaces the whole value. Both the
/// camelCase contract keys and the provider-flavored snake_case keys (`github_id`, `username`,
/// `name`, `avatar_url`) are accepted, and unknown fields are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	/// Numeric account identifier at the identity provider.
	#[serde(alias = "provider_id", alias = "github_id")]
	pub provider_id: u64,
	/// Login handle at the identity provider.
	#[serde(alias = "username", alias = "login")]
	pub handle: String,
	/// Optional display name.
	#[serde(default, alias = "display_name", alias = "name")]
	pub display_name: Option<String>,
	/// Optional primary email address.
	#[serde(default)]
	pub email: Option<String>,
	/// Avatar image URL; an absent or `null` value decodes as empty.
	#[serde(default, alias = "avatar_url", deserialize_with = "null_as_empty")]
	pub avatar_url: String,
}
impl User {
	/// Name to show in a UI: the display name when set, otherwise the handle.
	pub fn label(&self) -> &str {
		self.display_name.as_deref().filter(|name| !name.trim().is_empty()).unwrap_or(&self.handle)
	}
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
