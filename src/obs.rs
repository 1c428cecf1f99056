//! Optional observability helpers for session operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_session.op` with the `op`
//!   (operation) and `stage` (call site) fields, plus request/response events from the HTTP
//!   adapter. Secrets (state tokens, authorization codes) are never recorded.
//! - Enable `metrics` to increment `oauth2_session_op_total{op, outcome}` for every manager
//!   call (`attempt`, then `success`, `failure`, or `cancelled`) and
//!   `oauth2_session_csrf_rejection_total{reason}` for every callback refused before the
//!   code exchange.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Session manager operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionOp {
	/// Login initiation (authorization URL + state issuance).
	InitiateLogin,
	/// Provider redirect reconciliation.
	HandleCallback,
	/// Current-user reconciliation.
	RefreshSession,
	/// Session termination.
	Logout,
}
impl SessionOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionOp::InitiateLogin => "initiate_login",
			SessionOp::HandleCallback => "handle_callback",
			SessionOp::RefreshSession => "refresh_session",
			SessionOp::Logout => "logout",
		}
	}
}
impl Display for SessionOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a manager operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure recorded in the session and returned to the caller.
	Failure,
	/// The caller dropped the operation before it settled.
	Cancelled,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
			OpOutcome::Cancelled => "cancelled",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
