// self
use crate::{
	_prelude::*,
	auth::{CallbackParams, User},
	http::BackendHttpClient,
	obs::{OpSpan, SessionOp},
	session::{CallbackStatus, SessionManager},
};

const NO_SESSION: &str = "The backend accepted the callback but did not establish a session.";

impl<C> SessionManager<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Completes a login attempt from the provider redirect.
	///
	/// The redirect is reconciled (provider error, parameter presence, CSRF state, code
	/// exchange) and, on success, the identity is refreshed from the backend. Failures clear the
	/// user, record the error, and mark the callback as [`CallbackStatus::Failed`]. `Ok(None)`
	/// means the exchange succeeded but the backend still reports no session.
	pub async fn handle_callback(&self, params: CallbackParams) -> Result<Option<User>> {
		const OP: SessionOp = SessionOp::HandleCallback;

		let span = OpSpan::new(OP, "handle_callback");
		let ticket = self.begin(OP, |cell| {
			cell.session.error = None;
			cell.callback = Some(CallbackStatus::Processing);
		});
		let result = span
			.instrument(async {
				self.reconciler.reconcile(params).await?;
				self.refresh_session().await
			})
			.await;

		self.settle(ticket, &result, |cell, current| {
			cell.callback = Some(match &result {
				Ok(Some(_)) => CallbackStatus::Succeeded,
				Ok(None) => CallbackStatus::Failed { reason: NO_SESSION.into() },
				Err(e) => CallbackStatus::Failed { reason: e.to_string() },
			});

			// The follow-up refresh already settled the session when it ran.
			if let (Err(e), true) = (&result, current) {
				cell.session.user = None;
				cell.session.reconciled = true;
				cell.session.error = Some(e.to_string());
			}
		});

		result
	}

	/// Parses the redirect URL's query and delegates to [`SessionManager::handle_callback`].
	pub async fn handle_callback_url(&self, redirect: &Url) -> Result<Option<User>> {
		self.handle_callback(CallbackParams::from_url(redirect)).await
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::CsrfToken;
	// self
	use super::*;
	use crate::{
		_preludet::build_scripted_test_manager,
		config::SessionConfig,
		error::CsrfFailure,
		session::SessionPhase,
	};

	const OCTOCAT: &str = "{\"providerId\":9,\"handle\":\"octocat\",\"avatarUrl\":\"\"}";

	fn config() -> SessionConfig {
		SessionConfig::builder(Url::parse("https://app.example.com").expect("URL should parse."))
			.build()
			.expect("Config should build.")
	}

	#[tokio::test]
	async fn successful_callback_refreshes_identity() {
		let (manager, http, storage, _) = build_scripted_test_manager(config());

		manager
			.csrf_store()
			.store(&CsrfToken::new("abc123".into()))
			.await
			.expect("Store should succeed.");
		http.respond("/auth/callback", 200, "{\"message\":\"Authentication successful\"}")
			.respond("/auth/me", 200, OCTOCAT);

		let redirect = Url::parse("https://app.example.com/auth/callback?code=xyz&state=abc123")
			.expect("URL should parse.");
		let user = manager
			.handle_callback_url(&redirect)
			.await
			.expect("Callback should succeed.")
			.expect("User should be present.");

		assert_eq!(user.handle, "octocat");
		assert_eq!(manager.callback_status(), Some(CallbackStatus::Succeeded));
		assert_eq!(manager.session().phase(), SessionPhase::Authenticated);
		assert!(storage.is_empty());

		let exchange = &http.requests()[0];

		assert_eq!(exchange.json, Some(serde_json::json!({ "code": "xyz", "state": "abc123" })));
	}

	#[tokio::test]
	async fn csrf_failure_is_recorded_without_exchange() {
		let (manager, http, _, _) = build_scripted_test_manager(config());

		manager
			.csrf_store()
			.store(&CsrfToken::new("abc123".into()))
			.await
			.expect("Store should succeed.");

		let err = manager
			.handle_callback(CallbackParams::new("xyz", "forged"))
			.await
			.expect_err("Forged state should fail.");

		assert!(matches!(err, Error::CsrfValidation(CsrfFailure::Mismatch)));
		assert!(http.requests().is_empty());

		let session = manager.session();

		assert_eq!(session.user, None);
		assert_eq!(session.error, Some(err.to_string()));
		assert!(!session.is_loading);
		assert!(matches!(manager.callback_status(), Some(CallbackStatus::Failed { .. })));
	}

	#[tokio::test]
	async fn exchange_without_session_is_reported() {
		let (manager, http, _, _) = build_scripted_test_manager(config());

		manager
			.csrf_store()
			.store(&CsrfToken::new("abc123".into()))
			.await
			.expect("Store should succeed.");
		http.respond("/auth/callback", 200, "{}").respond("/auth/me", 401, "{}");

		let user = manager
			.handle_callback(CallbackParams::new("xyz", "abc123"))
			.await
			.expect("Exchange itself should succeed.");

		assert_eq!(user, None);
		assert_eq!(
			manager.callback_status(),
			Some(CallbackStatus::Failed { reason: NO_SESSION.into() })
		);
		assert_eq!(manager.session().phase(), SessionPhase::Anonymous);
	}

	#[tokio::test]
	async fn provider_denial_clears_session_without_exchange() {
		let (manager, http, storage, _) = build_scripted_test_manager(config());

		manager
			.csrf_store()
			.store(&CsrfToken::new("abc123".into()))
			.await
			.expect("Store should succeed.");

		let err = manager
			.handle_callback(CallbackParams::denied("access_denied", None))
			.await
			.expect_err("Denial should fail.");

		assert!(matches!(err, Error::ProviderDenied { .. }));
		assert!(http.requests().is_empty());
		assert!(storage.is_empty(), "Denial should discard the pending state.");

		let session = manager.session();

		assert_eq!(session.user, None);
		assert_eq!(session.error, Some(err.to_string()));
		assert!(session.error.is_some_and(|message| message.contains("access_denied")));
		assert!(!session.is_loading);
	}
}
