#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
// self
use common::*;
use oauth2_session::{error::Error, session::SessionPhase, time::Duration};

#[tokio::test]
async fn signed_in_user_is_adopted() {
	let server = MockServer::start_async().await;
	let Harness { manager, .. } = harness(config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(200).header("content-type", "application/json").body(OCTOCAT);
		})
		.await;
	let user = manager
		.refresh_session()
		.await
		.expect("Refresh should succeed.")
		.expect("User should be present.");

	mock.assert_async().await;

	assert_eq!(user.provider_id, 583231);
	assert_eq!(user.email.as_deref(), Some("octocat@github.com"));
	assert_eq!(manager.session().phase(), SessionPhase::Authenticated);
}

#[tokio::test]
async fn unauthorized_means_anonymous_without_error() {
	let server = MockServer::start_async().await;
	let Harness { manager, .. } = harness(config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Not authenticated\"}");
		})
		.await;
	let user = manager.refresh_session().await.expect("HTTP 401 is not an error.");

	mock.assert_async().await;

	assert_eq!(user, None);

	let session = manager.session();

	assert_eq!(session.user, None);
	assert_eq!(session.error, None);
	assert!(!session.is_loading);
	assert_eq!(session.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn server_errors_are_recorded() {
	let server = MockServer::start_async().await;
	let Harness { manager, .. } = harness(config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(500).body("Internal Server Error");
		})
		.await;
	let err = manager.refresh_session().await.expect_err("HTTP 500 should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::SessionRefresh(ref e) if e.status() == Some(500)));

	let session = manager.session();

	assert_eq!(session.user, None);
	assert_eq!(session.error, Some(err.to_string()));
	assert!(!session.is_loading);
}

#[tokio::test]
async fn slow_backend_times_out() {
	let server = MockServer::start_async().await;
	let config = oauth2_session::config::SessionConfig::builder(
		oauth2_session::url::Url::parse(&server.base_url())
			.expect("Mock backend URL should parse successfully."),
	)
	.request_timeout(Duration::milliseconds(200))
	.build()
	.expect("Configuration should be valid.");
	let Harness { manager, .. } = harness(config);
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(200).delay(std::time::Duration::from_secs(2)).body(OCTOCAT);
		})
		.await;
	let err = manager.refresh_session().await.expect_err("Slow backend should time out.");

	assert!(matches!(err, Error::SessionRefresh(ref e) if e.is_transport()));
	assert!(!manager.session().is_loading);
}
