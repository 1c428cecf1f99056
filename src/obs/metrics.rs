//! Session counters exported through the global `metrics` recorder.
//!
//! - `oauth2_session_op_total{op, outcome}`: one `attempt` per manager call, then exactly one
//!   of `success`, `failure`, or `cancelled` (the caller dropped the future before it settled).
//! - `oauth2_session_csrf_rejection_total{reason}`: callbacks stopped before the code exchange,
//!   with `reason` one of `missing`, `mismatch`, or `expired`.

// self
use crate::{
	error::CsrfFailure,
	obs::{OpOutcome, SessionOp},
};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(op: SessionOp, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"oauth2_session_op_total",
		"op" => op.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (op, outcome);
}

/// Counts a callback rejected by CSRF validation.
pub fn record_csrf_rejection(failure: CsrfFailure) {
	#[cfg(feature = "metrics")]
	metrics::counter!("oauth2_session_csrf_rejection_total", "reason" => failure.label())
		.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = failure;
}
