#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
// self
use common::*;
use oauth2_session::{config::SessionConfig, error::Error, url::Url};

#[tokio::test]
async fn initiate_login_stores_state_and_navigates() {
	let server = MockServer::start_async().await;
	let Harness { manager, storage, navigator } = harness(config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "url": AUTHORIZE_URL, "state": "abc123" }));
		})
		.await;
	let url = manager.initiate_login().await.expect("Login should start successfully.");

	mock.assert_async().await;

	assert_eq!(url.as_str(), AUTHORIZE_URL);
	assert_eq!(navigator.visited(), vec![url]);
	assert!(storage.contains(manager.csrf_store().key()));

	let session = manager.session();

	assert!(!session.is_loading, "Login must not leave the session loading.");
	assert_eq!(session.error, None);
}

#[tokio::test]
async fn backend_failure_surfaces_detail_and_settles() {
	let server = MockServer::start_async().await;
	let Harness { manager, storage, navigator } = harness(config(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/login");
			then.status(500)
				.header("content-type", "application/json")
				.body("{\"detail\":\"GitHub OAuth is not configured\"}");
		})
		.await;
	let err = manager.initiate_login().await.expect_err("Login should fail on HTTP 500.");

	mock.assert_calls_async(1).await;

	assert!(matches!(err, Error::LoginInitiation { .. }));
	assert!(navigator.visited().is_empty());
	assert!(storage.is_empty());

	let session = manager.session();

	assert!(!session.is_loading);
	assert_eq!(session.error, Some(err.to_string()));
}

#[tokio::test]
async fn unreachable_backend_is_a_login_failure() {
	let config = SessionConfig::builder(
		Url::parse("http://127.0.0.1:9").expect("Discard port URL should parse successfully."),
	)
	.build()
	.expect("Loopback configuration should be valid.");
	let Harness { manager, navigator, .. } = harness(config);
	let err = manager.initiate_login().await.expect_err("Login should fail without a backend.");

	assert!(matches!(err, Error::LoginInitiation { source: Some(_), .. }));
	assert!(navigator.visited().is_empty());
	assert!(!manager.session().is_loading);
}
