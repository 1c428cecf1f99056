#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
// self
use oauth2_session::{
	config::SessionConfig,
	navigate::RecordingNavigator,
	session::ReqwestSessionManager,
	store::MemoryStateStorage,
	url::Url,
};

pub const AUTHORIZE_URL: &str =
	"https://github.com/login/oauth/authorize?client_id=Iv1.test&scope=read%3Auser+user%3Aemail&state=abc123";
pub const OCTOCAT: &str = "{\"github_id\":583231,\"username\":\"octocat\",\"name\":\"The Octocat\",\"email\":\"octocat@github.com\",\"avatar_url\":\"https://avatars.githubusercontent.com/u/583231\"}";

pub struct Harness {
	pub manager: ReqwestSessionManager,
	pub storage: Arc<MemoryStateStorage>,
	pub navigator: Arc<RecordingNavigator>,
}

pub fn config(server: &MockServer) -> SessionConfig {
	SessionConfig::builder(
		Url::parse(&server.base_url()).expect("Mock backend URL should parse successfully."),
	)
	.build()
	.expect("Mock backend configuration should be valid.")
}

pub fn harness(config: SessionConfig) -> Harness {
	let storage = Arc::new(MemoryStateStorage::default());
	let navigator = Arc::new(RecordingNavigator::default());
	let manager = ReqwestSessionManager::new(config, storage.clone(), navigator.clone())
		.expect("Reqwest-backed session manager should build.");

	Harness { manager, storage, navigator }
}
