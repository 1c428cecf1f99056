//! Storage contracts and built-in implementations for the pending CSRF state token.

pub mod csrf;
pub mod file;
pub mod memory;

pub use csrf::*;
pub use file::FileStateStorage;
pub use memory::MemoryStateStorage;

// self
use crate::_prelude::*;

/// Boxed future returned by [`StateStorage`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Injectable key-value contract backing [`CsrfStateStore`].
///
/// Implementations decide the scope of a key (a process, a browser tab, a file on disk);
/// `take` must read and remove the entry atomically.
pub trait StateStorage
where
	Self: Send + Sync,
{
	/// Stores `entry` under `key`, replacing any previous value.
	fn put<'a>(&'a self, key: &'a str, entry: StateEntry) -> StoreFuture<'a, ()>;

	/// Removes and returns the entry stored under `key`, if present.
	fn take<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<StateEntry>>;
}

/// Stored CSRF value plus the instant it was written.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
	/// Opaque state secret.
	pub value: String,
	/// Instant the entry was stored.
	pub stored_at: OffsetDateTime,
}
impl StateEntry {
	/// Creates an entry stamped with `stored_at`.
	pub fn new(value: impl Into<String>, stored_at: OffsetDateTime) -> Self {
		Self { value: value.into(), stored_at }
	}
}
impl Debug for StateEntry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StateEntry")
			.field("value", &"<redacted>")
			.field("stored_at", &self.stored_at)
			.finish()
	}
}

/// Error type produced by [`StateStorage`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
