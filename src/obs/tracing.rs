// self
use crate::{
	_prelude::*,
	error::{CsrfFailure, TransportError},
	http::BackendMethod,
	obs::SessionOp,
	session::Session,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// `oauth2_session.op` span wrapping one manager call.
///
/// `op` names the manager operation and `stage` the call site; nested operations (the refresh
/// run by a successful callback) open a child span under their caller's.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Opens the span for `op` at `stage`.
	pub fn new(op: SessionOp, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_session.op", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span, entering it only while the future is polled.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event before a backend request is dispatched.
pub(crate) fn trace_request(method: BackendMethod, url: &Url) {
	#[cfg(feature = "tracing")]
	tracing::debug!(method = method.as_str(), path = url.path(), "Dispatching backend request.");

	#[cfg(not(feature = "tracing"))]
	let _ = (method, url);
}

/// Emits an event for a received backend response, escalating by status class.
pub(crate) fn trace_response(method: BackendMethod, url: &Url, status: u16) {
	#[cfg(feature = "tracing")]
	{
		let (method, path) = (method.as_str(), url.path());

		match status {
			401 => {
				let message = "Unauthorized request; user may need to log in.";

				tracing::warn!(method, path, status, "{message}")
			},
			403 => tracing::warn!(method, path, status, "Forbidden; insufficient permissions."),
			429 => tracing::warn!(method, path, status, "Rate limited by the backend."),
			500.. => tracing::error!(method, path, status, "Backend server error."),
			400.. => tracing::warn!(method, path, status, "Backend request failed."),
			_ => tracing::debug!(method, path, status, "Backend request completed."),
		}
	}

	#[cfg(not(feature = "tracing"))]
	let _ = (method, url, status);
}

/// Emits an error event when no response was received.
pub(crate) fn trace_transport_failure(method: BackendMethod, url: &Url, err: &TransportError) {
	#[cfg(feature = "tracing")]
	tracing::error!(
		method = method.as_str(),
		path = url.path(),
		error = %err,
		"Network error; no response received."
	);

	#[cfg(not(feature = "tracing"))]
	let _ = (method, url, err);
}

/// Emits a warning when a callback fails CSRF validation.
pub(crate) fn trace_csrf_rejection(failure: CsrfFailure) {
	#[cfg(feature = "tracing")]
	tracing::warn!(reason = failure.label(), "Rejected callback during CSRF validation.");

	#[cfg(not(feature = "tracing"))]
	let _ = failure;
}

/// Emits a debug event describing the session after a transition.
pub(crate) fn trace_session(session: &Session) {
	#[cfg(feature = "tracing")]
	tracing::debug!(
		phase = session.phase().as_str(),
		user = session.user.as_ref().map(|user| user.handle.as_str()),
		error = session.error.as_deref(),
		"Session state changed."
	);

	#[cfg(not(feature = "tracing"))]
	let _ = session;
}
