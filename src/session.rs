//! Session manager: owner of the canonical session state and its transitions.
//!
//! [`SessionManager`] is the single writer of the [`Session`] cell. Every operation
//! (`initiate_login`, `handle_callback`, `refresh_session`, `logout`) marks the session as
//! loading, talks to the backend, and records any failure as the session's `error` before
//! handing it back, so callers never have to patch the state themselves.
//!
//! # Overlapping operations
//!
//! Each operation draws a generation ticket when it starts. When its response arrives the
//! result is applied only if no other operation was issued in the meantime, so the last call
//! issued wins rather than the last response to arrive. `is_loading` tracks the number of
//! operations still in flight and drops to `false` once all of them have settled. A
//! completed logout always clears the user and supersedes every operation still in flight.

mod callback;
mod login;
mod logout;
mod refresh;
mod state;

pub use state::*;

// crates.io
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	backend::BackendApi,
	config::SessionConfig,
	http::BackendHttpClient,
	navigate::Navigator,
	obs::{self, OpOutcome, SessionOp},
	reconcile::CallbackReconciler,
	store::{CsrfStateStore, StateStorage},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const CALLBACK_CANCELLED: &str = "The callback was cancelled before it completed.";

#[cfg(feature = "reqwest")]
/// Session manager specialized for the crate's default reqwest transport stack.
pub type ReqwestSessionManager = SessionManager<ReqwestHttpClient>;

/// Owns the session state and exposes the authentication state transitions.
pub struct SessionManager<C>
where
	C: ?Sized + BackendHttpClient,
{
	backend: Arc<BackendApi<C>>,
	reconciler: CallbackReconciler<C>,
	csrf: CsrfStateStore,
	navigator: Arc<dyn Navigator>,
	config: SessionConfig,
	cell: Mutex<SessionCell>,
	updates: watch::Sender<Session>,
}
impl<C> SessionManager<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Creates a manager that reuses the caller-provided transport.
	pub fn with_http_client(
		config: SessionConfig,
		http_client: impl Into<Arc<C>>,
		storage: Arc<dyn StateStorage>,
		navigator: Arc<dyn Navigator>,
	) -> Self {
		let backend = Arc::new(BackendApi::new(http_client, config.endpoints.clone()));
		let csrf = CsrfStateStore::new(storage)
			.with_key(config.state_key.clone())
			.with_ttl(config.state_ttl);
		let reconciler = CallbackReconciler::new(backend.clone(), csrf.clone(), config.csrf_policy);
		let (updates, _) = watch::channel(Session::default());

		Self {
			backend,
			reconciler,
			csrf,
			navigator,
			config,
			cell: Default::default(),
			updates,
		}
	}

	/// Snapshot of the current session.
	pub fn session(&self) -> Session {
		self.cell.lock().session.clone()
	}

	/// Progress of the most recent callback, if one was handled.
	pub fn callback_status(&self) -> Option<CallbackStatus> {
		self.cell.lock().callback.clone()
	}

	/// Configuration the manager was built with.
	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	/// CSRF state store holding the pending login attempt.
	pub fn csrf_store(&self) -> &CsrfStateStore {
		&self.csrf
	}

	/// Backend endpoint client.
	pub fn backend(&self) -> &BackendApi<C> {
		&self.backend
	}

	/// Returns a receiver that always holds the latest session snapshot.
	///
	/// Every state change marks the receiver as changed; intermediate snapshots may be
	/// coalesced when the receiver falls behind. Dropping the receiver unsubscribes.
	pub fn subscribe(&self) -> watch::Receiver<Session> {
		self.updates.subscribe()
	}

	/// Resets `error` without touching `user` or `is_loading`.
	pub fn clear_error(&self) {
		let snapshot = {
			let mut cell = self.cell.lock();

			if cell.session.error.is_none() {
				return;
			}

			cell.session.error = None;
			cell.session.clone()
		};

		self.publish(snapshot);
	}

	fn begin<F>(&self, op: SessionOp, prepare: F) -> Ticket<'_, C>
	where
		F: FnOnce(&mut SessionCell),
	{
		obs::record_op_outcome(op, OpOutcome::Attempt);

		let (generation, snapshot) = {
			let mut cell = self.cell.lock();

			cell.in_flight += 1;
			cell.issued += 1;
			cell.session.is_loading = true;
			prepare(&mut cell);

			(cell.issued, cell.session.clone())
		};

		self.publish(snapshot);

		Ticket { manager: self, op, generation, settled: false }
	}

	/// Settles `ticket`; `apply` learns whether the ticket is still the latest one issued.
	fn settle<T, F>(&self, mut ticket: Ticket<'_, C>, result: &Result<T>, apply: F)
	where
		F: FnOnce(&mut SessionCell, bool),
	{
		ticket.settled = true;

		let snapshot = {
			let mut cell = self.cell.lock();
			let current = ticket.generation == cell.issued;

			cell.in_flight = cell.in_flight.saturating_sub(1);
			apply(&mut cell, current);
			cell.session.is_loading = cell.in_flight > 0;
			cell.session.clone()
		};

		obs::record_op_outcome(
			ticket.op,
			if result.is_ok() { OpOutcome::Success } else { OpOutcome::Failure },
		);
		self.publish(snapshot);
	}

	/// Releases a ticket whose operation was dropped before it settled.
	fn abandon(&self, op: SessionOp) {
		let snapshot = {
			let mut cell = self.cell.lock();

			cell.in_flight = cell.in_flight.saturating_sub(1);

			if op == SessionOp::HandleCallback && cell.callback == Some(CallbackStatus::Processing)
			{
				cell.callback = Some(CallbackStatus::Failed { reason: CALLBACK_CANCELLED.into() });
			}

			cell.session.is_loading = cell.in_flight > 0;
			cell.session.clone()
		};

		obs::record_op_outcome(op, OpOutcome::Cancelled);
		self.publish(snapshot);
	}

	fn publish(&self, snapshot: Session) {
		obs::trace_session(&snapshot);
		self.updates.send_replace(snapshot);
	}
}
#[cfg(feature = "reqwest")]
impl SessionManager<ReqwestHttpClient> {
	/// Creates a manager backed by a credentialed (cookie-carrying) reqwest client whose
	/// requests are bounded by [`SessionConfig::request_timeout`].
	pub fn new(
		config: SessionConfig,
		storage: Arc<dyn StateStorage>,
		navigator: Arc<dyn Navigator>,
	) -> Result<Self> {
		let http_client = ReqwestHttpClient::credentialed(config.request_timeout)?;

		Ok(Self::with_http_client(config, http_client, storage, navigator))
	}
}
impl<C> Debug for SessionManager<C>
where
	C: ?Sized + BackendHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionManager")
			.field("config", &self.config)
			.field("session", &self.session())
			.field("subscribers", &self.updates.receiver_count())
			.finish()
	}
}

#[derive(Debug, Default)]
struct SessionCell {
	session: Session,
	callback: Option<CallbackStatus>,
	in_flight: u32,
	issued: u64,
}

/// In-flight marker for one operation; dropping it unsettled (e.g. when the caller's
/// deadline cancels the future) still releases its share of `is_loading`.
struct Ticket<'a, C>
where
	C: ?Sized + BackendHttpClient,
{
	manager: &'a SessionManager<C>,
	op: SessionOp,
	generation: u64,
	settled: bool,
}
impl<C> Drop for Ticket<'_, C>
where
	C: ?Sized + BackendHttpClient,
{
	fn drop(&mut self) {
		if !self.settled {
			self.manager.abandon(self.op);
		}
	}
}
