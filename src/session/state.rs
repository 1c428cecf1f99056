//! Session snapshot types published to subscribers.

// self
use crate::{_prelude::*, auth::User};

/// Client-local belief about the current authenticated identity.
///
/// `user` is present iff the most recent reconciliation returned a valid identity, and
/// `is_loading` is true only while at least one state-changing operation is in flight.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
	/// Authenticated user, if any.
	pub user: Option<User>,
	/// Whether an operation is in flight.
	pub is_loading: bool,
	/// Human-readable description of the last failure.
	pub error: Option<String>,
	/// Whether the backend has been consulted at least once.
	pub reconciled: bool,
}
impl Session {
	/// Whether a user is signed in.
	pub fn is_authenticated(&self) -> bool {
		self.user.is_some()
	}

	/// Externally observed state-machine position.
	pub fn phase(&self) -> SessionPhase {
		match (self.is_loading, &self.user, self.reconciled) {
			(true, _, _) => SessionPhase::Loading,
			(false, Some(_), _) => SessionPhase::Authenticated,
			(false, None, true) => SessionPhase::Anonymous,
			(false, None, false) => SessionPhase::Unknown,
		}
	}
}

/// `Unknown -> Loading -> {Authenticated, Anonymous}`; `Loading` is re-entered by every
/// operation and no phase is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
	/// Nothing has been reconciled yet.
	Unknown,
	/// An operation is in flight.
	Loading,
	/// A user is signed in.
	Authenticated,
	/// The backend reported no session.
	Anonymous,
}
impl SessionPhase {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionPhase::Unknown => "unknown",
			SessionPhase::Loading => "loading",
			SessionPhase::Authenticated => "authenticated",
			SessionPhase::Anonymous => "anonymous",
		}
	}
}
impl Display for SessionPhase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Progress of the most recent callback, for the surface rendering the redirect route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackStatus {
	/// Reconciliation or the follow-up refresh is still running.
	Processing,
	/// The callback established a session.
	Succeeded,
	/// The callback failed.
	Failed {
		/// Human-readable reason.
		reason: String,
	},
}
