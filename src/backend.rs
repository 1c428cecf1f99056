//! Typed calls against the backend's session endpoints.
//!
//! [`BackendApi`] turns raw [`BackendResponse`](crate::http::BackendResponse) values into the
//! contract types and the uniform [`RequestError`] shape. It owns exactly one policy decision:
//! a 401 from the current-user endpoint means "not authenticated" and is not an error.

// crates.io
use oauth2::{AuthorizationCode, CsrfToken};
// self
use crate::{
	_prelude::*,
	auth::User,
	config::SessionEndpoints,
	error::RequestError,
	http::{BackendHttpClient, BackendRequest, BackendResponse},
	obs,
};

/// Payload returned by the login endpoint.
#[derive(Clone, Deserialize)]
pub struct LoginGrant {
	/// Provider authorization URL to send the user to.
	pub url: String,
	/// State token the backend embedded in `url`, when it reports one separately.
	#[serde(default)]
	pub state: Option<String>,
}
impl Debug for LoginGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginGrant")
			.field("url", &self.url)
			.field("state_set", &self.state.is_some())
			.finish()
	}
}

/// Backend endpoint client shared by the session manager and callback reconciler.
pub struct BackendApi<C>
where
	C: ?Sized + BackendHttpClient,
{
	http_client: Arc<C>,
	endpoints: SessionEndpoints,
}
impl<C> BackendApi<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Creates an endpoint client over `http_client`.
	pub fn new(http_client: impl Into<Arc<C>>, endpoints: SessionEndpoints) -> Self {
		Self { http_client: http_client.into(), endpoints }
	}

	/// Endpoint URLs used by this client.
	pub fn endpoints(&self) -> &SessionEndpoints {
		&self.endpoints
	}

	/// Underlying transport.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// `GET` login endpoint: requests an authorization URL (and state, when issued).
	pub async fn login(&self) -> Result<LoginGrant, RequestError> {
		self.send(BackendRequest::get(self.endpoints.login.clone()))
			.await?
			.error_for_status()?
			.decode()
	}

	/// `GET` current-user endpoint; `Ok(None)` when the backend answers 401.
	pub async fn current_user(&self) -> Result<Option<User>, RequestError> {
		let response = self.send(BackendRequest::get(self.endpoints.me.clone())).await?;

		if response.status == 401 {
			return Ok(None);
		}

		response.error_for_status()?.decode().map(Some)
	}

	/// `POST` logout endpoint; the response body is ignored.
	pub async fn logout(&self) -> Result<(), RequestError> {
		self.send(BackendRequest::post(self.endpoints.logout.clone())).await?.error_for_status()?;

		Ok(())
	}

	/// `POST` callback endpoint: submits the authorization code and the validated state.
	pub async fn exchange(
		&self,
		code: &AuthorizationCode,
		state: &CsrfToken,
	) -> Result<(), RequestError> {
		let request = BackendRequest::post(self.endpoints.callback.clone()).with_json(
			serde_json::json!({ "code": code.secret(), "state": state.secret() }),
		);

		self.send(request).await?.error_for_status()?;

		Ok(())
	}

	async fn send(&self, request: BackendRequest) -> Result<BackendResponse, RequestError> {
		let method = request.method;
		let url = request.url.clone();

		obs::trace_request(method, &url);

		match self.http_client.execute(request).await {
			Ok(response) => {
				obs::trace_response(method, &url, response.status);

				Ok(response)
			},
			Err(err) => {
				obs::trace_transport_failure(method, &url, &err);

				Err(err.into())
			},
		}
	}
}
impl<C> Debug for BackendApi<C>
where
	C: ?Sized + BackendHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BackendApi").field("endpoints", &self.endpoints).finish()
	}
}
