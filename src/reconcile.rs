//! Callback reconciliation: turns a provider redirect into a validated code exchange.
//!
//! [`CallbackReconciler::reconcile`] runs the checks in a fixed order:
//!
//! 1. A provider `error` fails with [`Error::ProviderDenied`]; nothing is exchanged.
//! 2. A missing `code` or `state` fails with [`Error::MalformedCallback`].
//! 3. The pending state token must exist and equal the returned `state`, otherwise
//!    [`Error::CsrfValidation`] stops the flow before any exchange.
//! 4. The code is submitted to the backend; a non-success answer is
//!    [`Error::CallbackExchange`].
//!
//! The pending token is consumed on every path, so a redirect can be reconciled at most once.
//! Reconciliation never populates session data; the manager refreshes the identity afterwards.

// crates.io
use oauth2::CsrfToken;
// self
use crate::{
	_prelude::*,
	auth::{self, CallbackParams},
	backend::BackendApi,
	config::CsrfPolicy,
	error::CsrfFailure,
	http::BackendHttpClient,
	obs,
	store::{ConsumedState, CsrfStateStore},
};

/// Validates provider redirects against the pending CSRF state and drives the code exchange.
pub struct CallbackReconciler<C>
where
	C: ?Sized + BackendHttpClient,
{
	backend: Arc<BackendApi<C>>,
	csrf: CsrfStateStore,
	policy: CsrfPolicy,
}
impl<C> CallbackReconciler<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Creates a reconciler sharing the manager's backend client and state store.
	pub fn new(backend: Arc<BackendApi<C>>, csrf: CsrfStateStore, policy: CsrfPolicy) -> Self {
		Self { backend, csrf, policy }
	}

	/// Reconciles one provider redirect.
	pub async fn reconcile(&self, params: CallbackParams) -> Result<()> {
		let pending = self.csrf.consume().await;
		let CallbackParams { code, state, error, error_description } = params;

		if let Some(error) = error {
			return Err(Error::ProviderDenied { error, description: error_description });
		}

		let code =
			code.ok_or(Error::MalformedCallback { reason: "authorization code is missing" })?;
		let state =
			state.ok_or(Error::MalformedCallback { reason: "state parameter is missing" })?;

		self.verify_state(&state, pending?)?;
		self.backend.exchange(&code, &state).await.map_err(Error::CallbackExchange)
	}

	fn verify_state(&self, received: &CsrfToken, pending: ConsumedState) -> Result<()> {
		let verdict = match (pending, self.policy) {
			(ConsumedState::Present(expected), _) =>
				if auth::state_matches(&expected, received) {
					Ok(())
				} else {
					Err(CsrfFailure::Mismatch)
				},
			(ConsumedState::Expired, _) => Err(CsrfFailure::Expired),
			(ConsumedState::Absent, CsrfPolicy::Enforce) => Err(CsrfFailure::Missing),
			(ConsumedState::Absent, CsrfPolicy::BackendManaged) => Ok(()),
		};

		verdict.map_err(|failure| {
			obs::trace_csrf_rejection(failure);
			obs::record_csrf_rejection(failure);

			Error::CsrfValidation(failure)
		})
	}
}
impl<C> Debug for CallbackReconciler<C>
where
	C: ?Sized + BackendHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallbackReconciler")
			.field("csrf", &self.csrf)
			.field("policy", &self.policy)
			.finish()
	}
}
