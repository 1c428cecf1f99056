//! File-backed [`StateStorage`] for command-line flows where the callback is handled by a
//! later process invocation than the one that initiated login.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{StateEntry, StateStorage, StoreError, StoreFuture},
};

/// Persists state entries to a JSON file after each mutation.
///
/// The snapshot is re-read under the lock before every operation so separate processes
/// sharing the file observe each other's writes.
#[derive(Clone, Debug)]
pub struct FileStateStorage {
	path: PathBuf,
	inner: Arc<Mutex<HashMap<String, StateEntry>>>,
}
impl FileStateStorage {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(Mutex::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, StateEntry>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(HashMap::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<String, StateEntry>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize state snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl StateStorage for FileStateStorage {
	fn put<'a>(&'a self, key: &'a str, entry: StateEntry) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut guard = self.inner.lock();

			*guard = Self::load_snapshot(&self.path)?;
			guard.insert(key.to_owned(), entry);
			self.persist_locked(&guard)
		})
	}

	fn take<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<StateEntry>> {
		Box::pin(async move {
			let mut guard = self.inner.lock();

			*guard = Self::load_snapshot(&self.path)?;

			let taken = guard.remove(key);

			if taken.is_some() {
				self.persist_locked(&guard)?;
			}

			Ok(taken)
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn temp_path(tag: &str) -> PathBuf {
		let unique = format!(
			"oauth2_session_state_{tag}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[tokio::test]
	async fn entry_survives_reopen_and_is_consumed_once() {
		let path = temp_path("reopen");
		let storage = FileStateStorage::open(&path).expect("Failed to open file state storage.");
		let entry = StateEntry::new("pending-state", OffsetDateTime::now_utc());

		storage.put("login", entry.clone()).await.expect("Failed to persist state entry.");
		drop(storage);

		let reopened = FileStateStorage::open(&path).expect("Failed to reopen file state storage.");
		let taken = reopened.take("login").await.expect("Failed to take persisted state entry.");

		assert_eq!(taken, Some(entry));
		assert!(reopened.take("login").await.expect("Second take should succeed.").is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary state snapshot {}: {e}", path.display())
		});
	}

	#[tokio::test]
	async fn handles_observe_each_other() {
		let path = temp_path("shared");
		let writer = FileStateStorage::open(&path).expect("Failed to open writer storage.");
		let reader = FileStateStorage::open(&path).expect("Failed to open reader storage.");

		writer
			.put("login", StateEntry::new("from-writer", OffsetDateTime::now_utc()))
			.await
			.expect("Writer put should succeed.");

		let taken = reader.take("login").await.expect("Reader take should succeed.");

		assert_eq!(taken.map(|entry| entry.value), Some("from-writer".into()));
		assert!(writer.take("login").await.expect("Writer take should succeed.").is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary state snapshot {}: {e}", path.display())
		});
	}
}
