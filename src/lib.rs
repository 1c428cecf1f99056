//! Client-side OAuth 2.0 authorization-code session manager: CSRF-checked callbacks,
//! backend-reconciled session state, and transport-aware observability in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod navigate;
pub mod obs;
pub mod reconcile;
pub mod session;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and an in-process backend for tests; enabled via `cfg(test)` or
	//! the `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{collections::VecDeque, io};
	// self
	use crate::{
		config::SessionConfig,
		error::TransportError,
		http::{BackendFuture, BackendHttpClient, BackendRequest, BackendResponse},
		navigate::RecordingNavigator,
		session::SessionManager,
		store::MemoryStateStorage,
	};

	/// Session manager type alias used by scripted (in-process) tests.
	pub type ScriptedTestManager = SessionManager<ScriptedHttpClient>;

	/// Constructs a [`SessionManager`] over a [`ScriptedHttpClient`].
	pub fn build_scripted_test_manager(
		config: SessionConfig,
	) -> (
		ScriptedTestManager,
		Arc<ScriptedHttpClient>,
		Arc<MemoryStateStorage>,
		Arc<RecordingNavigator>,
	) {
		let http_client = Arc::new(ScriptedHttpClient::default());
		let storage = Arc::new(MemoryStateStorage::default());
		let navigator = Arc::new(RecordingNavigator::default());
		let manager = SessionManager::with_http_client(
			config,
			http_client.clone(),
			storage.clone(),
			navigator.clone(),
		);

		(manager, http_client, storage, navigator)
	}

	/// Canned reply returned by [`ScriptedHttpClient`].
	#[derive(Clone, Debug)]
	pub enum ScriptedReply {
		/// Respond with a status and raw body.
		Respond {
			/// HTTP status code.
			status: u16,
			/// Raw response body.
			body: String,
		},
		/// Fail before any response is received.
		Unreachable,
	}

	/// In-process [`BackendHttpClient`] that replays queued replies per URL path and records
	/// every request it sees.
	#[derive(Debug, Default)]
	pub struct ScriptedHttpClient {
		routes: Mutex<HashMap<String, VecDeque<ScriptedReply>>>,
		requests: Mutex<Vec<BackendRequest>>,
	}
	impl ScriptedHttpClient {
		/// Queues a response for `path`.
		pub fn respond(&self, path: &str, status: u16, body: impl Into<String>) -> &Self {
			self.push(path, ScriptedReply::Respond { status, body: body.into() })
		}

		/// Queues a transport failure for `path`.
		pub fn unreachable(&self, path: &str) -> &Self {
			self.push(path, ScriptedReply::Unreachable)
		}

		/// Number of requests dispatched to `path`.
		pub fn calls_to(&self, path: &str) -> usize {
			self.requests.lock().iter().filter(|request| request.url.path() == path).count()
		}

		/// Every request observed so far, in dispatch order.
		pub fn requests(&self) -> Vec<BackendRequest> {
			self.requests.lock().clone()
		}

		fn push(&self, path: &str, reply: ScriptedReply) -> &Self {
			self.routes.lock().entry(path.to_owned()).or_default().push_back(reply);

			self
		}
	}
	impl BackendHttpClient for ScriptedHttpClient {
		fn execute(&self, request: BackendRequest) -> BackendFuture<'_> {
			let path = request.url.path().to_owned();
			let reply = self.routes.lock().get_mut(&path).and_then(VecDeque::pop_front);

			self.requests.lock().push(request);

			Box::pin(async move {
				match reply {
					Some(ScriptedReply::Respond { status, body }) =>
						Ok(BackendResponse { status, body: body.into_bytes() }),
					Some(ScriptedReply::Unreachable) => Err(TransportError::Io(io::Error::new(
						io::ErrorKind::ConnectionRefused,
						"scripted backend is unreachable",
					))),
					None => {
						let body = format!("{{\"detail\":\"No scripted reply for {path}\"}}");

						Ok(BackendResponse { status: 404, body: body.into_bytes() })
					},
				}
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2::{AuthorizationCode, CsrfToken};
#[cfg(feature = "reqwest")] pub use reqwest;
pub use time;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
