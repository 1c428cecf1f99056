// self
use crate::{
	_prelude::*,
	auth::User,
	http::BackendHttpClient,
	obs::{OpSpan, SessionOp},
	session::SessionManager,
};

impl<C> SessionManager<C>
where
	C: ?Sized + BackendHttpClient,
{
	/// Asks the backend who is signed in and reconciles the session with the answer.
	///
	/// A 401 is the normal "not authenticated" answer: the user is cleared without recording an
	/// error. Any other failure clears the user and records the error. The returned value is this
	/// call's own answer; the session only adopts it when no newer operation was issued while
	/// the request was outstanding.
	pub async fn refresh_session(&self) -> Result<Option<User>> {
		const OP: SessionOp = SessionOp::RefreshSession;

		let span = OpSpan::new(OP, "refresh_session");
		let ticket = self.begin(OP, |_| {});
		let result =
			span.instrument(self.backend.current_user()).await.map_err(Error::SessionRefresh);

		self.settle(ticket, &result, |cell, current| {
			if !current {
				return;
			}

			cell.session.reconciled = true;

			match &result {
				Ok(user) => {
					cell.session.user = user.clone();
					cell.session.error = None;
				},
				Err(e) => {
					cell.session.user = None;
					cell.session.error = Some(e.to_string());
				},
			}
		});

		result
	}
}
