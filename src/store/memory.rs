//! Thread-safe in-memory [`StateStorage`] scoped to the running client instance.

// self
use crate::{
	_prelude::*,
	store::{StateEntry, StateStorage, StoreFuture},
};

type StateMap = Arc<RwLock<HashMap<String, StateEntry>>>;

/// Storage backend that keeps state entries in-process; dropping it forgets every pending
/// login attempt.
#[derive(Clone, Debug, Default)]
pub struct MemoryStateStorage(StateMap);
impl MemoryStateStorage {
	/// Number of keys currently holding an entry.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Whether no entry is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Whether `key` currently holds an entry.
	pub fn contains(&self, key: &str) -> bool {
		self.0.read().contains_key(key)
	}

	fn put_now(map: StateMap, key: String, entry: StateEntry) {
		map.write().insert(key, entry);
	}

	fn take_now(map: StateMap, key: &str) -> Option<StateEntry> {
		map.write().remove(key)
	}
}
impl StateStorage for MemoryStateStorage {
	fn put<'a>(&'a self, key: &'a str, entry: StateEntry) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = key.to_owned();

		Box::pin(async move {
			Self::put_now(map, key, entry);

			Ok(())
		})
	}

	fn take<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<StateEntry>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::take_now(map, key)) })
	}
}
