// crates.io
use oauth2::CsrfToken;
// self
use crate::{
	_prelude::*,
	auth,
	config::CsrfPolicy,
	http::BackendHttpClient,
	obs::{OpSpan, SessionOp},
	session::SessionManager,
};

impl<C> SessionManager<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Starts a login attempt and hands the user agent to the identity provider.
	///
	/// The backend's authorization URL is validated, its state token is stored as the pending
	/// attempt (replacing any older one), and the navigator is pointed at the URL. On success
	/// the URL is returned and the session settles with `is_loading == false`; the attempt
	/// itself continues outside the process until the provider redirects back.
	pub async fn initiate_login(&self) -> Result<Url> {
		const OP: SessionOp = SessionOp::InitiateLogin;

		let span = OpSpan::new(OP, "initiate_login");
		let ticket = self.begin(OP, |cell| cell.session.error = None);
		let result = span.instrument(self.start_login()).await;

		self.settle(ticket, &result, |cell, current| {
			if let (Err(e), true) = (&result, current) {
				cell.session.error = Some(e.to_string());
			}
		});

		result
	}

	async fn start_login(&self) -> Result<Url> {
		let grant = self.backend.login().await.map_err(|e| {
			Error::login_initiation_caused_by("the backend did not issue an authorization URL", e)
		})?;
		let url = Url::parse(grant.url.trim()).map_err(|e| {
			let reason = "the backend returned an invalid authorization URL";

			Error::login_initiation_caused_by(reason, e)
		})?;

		if !matches!(url.scheme(), "https" | "http") {
			return Err(Error::login_initiation("the authorization URL must use HTTP(S)"));
		}

		let state = grant
			.state
			.filter(|state| !state.is_empty())
			.map(CsrfToken::new)
			.or_else(|| auth::state_from_authorize_url(&url));

		match (state, self.config.csrf_policy) {
			(Some(token), _) => self.csrf.store(&token).await?,
			(None, CsrfPolicy::Enforce) =>
				return Err(Error::login_initiation("the backend did not issue a CSRF state token")),
			// A stale token from an older attempt would otherwise reject this attempt's callback.
			(None, CsrfPolicy::BackendManaged) => {
				self.csrf.consume().await?;
			},
		}

		self.navigator.navigate(&url).map_err(|e| {
			Error::login_initiation_caused_by("navigation to the identity provider failed", e)
		})?;

		Ok(url)
	}
}
