//! Single-slot CSRF state store layered over an injectable [`StateStorage`].

// crates.io
use oauth2::CsrfToken;
// self
use crate::{
	_prelude::*,
	store::{StateEntry, StateStorage, StoreError},
};

/// Default storage key for the pending state token.
pub const DEFAULT_STATE_KEY: &str = "oauth2_session.csrf_state";
/// Default lifetime of a pending state token.
pub const DEFAULT_STATE_TTL: Duration = Duration::minutes(10);

/// Outcome of [`CsrfStateStore::consume`].
#[derive(Clone, Debug)]
pub enum ConsumedState {
	/// No token was stored.
	Absent,
	/// A token was stored but outlived the configured time-to-live.
	Expired,
	/// The stored token, now removed from storage.
	Present(CsrfToken),
}
impl ConsumedState {
	/// Returns the token when it was present and fresh.
	pub fn into_token(self) -> Option<CsrfToken> {
		match self {
			Self::Present(token) => Some(token),
			Self::Absent | Self::Expired => None,
		}
	}
}

/// Holds at most one pending state token per key.
///
/// `store` overwrites (last write wins, so an earlier in-flight login attempt fails
/// validation when it returns) and `consume` reads-and-clears in one storage call.
#[derive(Clone)]
pub struct CsrfStateStore {
	storage: Arc<dyn StateStorage>,
	key: String,
	ttl: Duration,
}
impl CsrfStateStore {
	/// Creates a store over `storage` using the default key and time-to-live.
	pub fn new(storage: Arc<dyn StateStorage>) -> Self {
		Self { storage, key: DEFAULT_STATE_KEY.into(), ttl: DEFAULT_STATE_TTL }
	}

	/// Overrides the storage key (e.g. one key per browser tab).
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.key = key.into();

		self
	}

	/// Overrides the time-to-live of a pending token.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Storage key used for the pending token.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Time-to-live applied to pending tokens.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Stores `token` as the single pending value, replacing any previous one.
	pub async fn store(&self, token: &CsrfToken) -> Result<(), StoreError> {
		self.store_at(token, OffsetDateTime::now_utc()).await
	}

	/// Removes the pending token and reports what was there.
	pub async fn consume(&self) -> Result<ConsumedState, StoreError> {
		self.consume_at(OffsetDateTime::now_utc()).await
	}

	pub(crate) async fn store_at(
		&self,
		token: &CsrfToken,
		now: OffsetDateTime,
	) -> Result<(), StoreError> {
		self.storage.put(&self.key, StateEntry::new(token.secret().as_str(), now)).await
	}

	pub(crate) async fn consume_at(
		&self,
		now: OffsetDateTime,
	) -> Result<ConsumedState, StoreError> {
		let consumed = match self.storage.take(&self.key).await? {
			None => ConsumedState::Absent,
			Some(entry) if now - entry.stored_at > self.ttl => ConsumedState::Expired,
			Some(entry) => ConsumedState::Present(CsrfToken::new(entry.value)),
		};

		Ok(consumed)
	}
}
impl Debug for CsrfStateStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CsrfStateStore").field("key", &self.key).field("ttl", &self.ttl).finish()
	}
}
