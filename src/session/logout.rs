// self
use crate::{
	_prelude::*,
	http::BackendHttpClient,
	obs::{OpSpan, SessionOp},
	session::SessionManager,
};

impl<C> SessionManager<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Terminates the backend session.
	///
	/// The local user is cleared whether or not the backend call succeeds, and every operation
	/// still in flight is superseded so a late identity response cannot sign the user back in.
	/// A failed call is recorded as the session error and returned.
	pub async fn logout(&self) -> Result<()> {
		const OP: SessionOp = SessionOp::Logout;

		let span = OpSpan::new(OP, "logout");
		let ticket = self.begin(OP, |_| {});
		let result = span.instrument(self.backend.logout()).await.map_err(Error::Logout);

		self.settle(ticket, &result, |cell, _| {
			cell.issued += 1;
			cell.session.user = None;
			cell.session.reconciled = true;
			cell.session.error = result.as_ref().err().map(ToString::to_string);
		});

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::build_scripted_test_manager, config::SessionConfig, session::SessionPhase,
	};

	fn config() -> SessionConfig {
		SessionConfig::builder(Url::parse("https://api.example.com").expect("URL should parse."))
			.build()
			.expect("Config should build.")
	}

	#[tokio::test]
	async fn failed_logout_still_signs_out_locally() {
		let (manager, http, _, _) = build_scripted_test_manager(config());

		let me = "{\"providerId\":7,\"handle\":\"octocat\",\"avatarUrl\":\"\"}";

		http.respond("/auth/me", 200, me)
			.respond("/auth/logout", 500, "{\"detail\":\"Session store unavailable\"}");
		manager.refresh_session().await.expect("Refresh should succeed.");

		let err = manager.logout().await.expect_err("Backend failure should surface.");
		let session = manager.session();

		assert!(matches!(err, Error::Logout(ref e) if e.status() == Some(500)));
		assert_eq!(session.user, None);
		assert_eq!(session.phase(), SessionPhase::Anonymous);
		assert!(session.error.is_some_and(|message| message.contains("Session store unavailable")));
	}

	#[tokio::test]
	async fn successful_logout_clears_error() {
		let (manager, http, _, _) = build_scripted_test_manager(config());

		http.unreachable("/auth/me").respond("/auth/logout", 200, "{\"message\":\"Logged out\"}");
		manager.refresh_session().await.expect_err("Refresh should fail.");
		manager.logout().await.expect("Logout should succeed.");

		let session = manager.session();

		assert_eq!(session.error, None);
		assert_eq!(session.user, None);
		assert!(!session.is_loading);
	}
}
