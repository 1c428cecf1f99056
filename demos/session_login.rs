//! Drives one login round trip against a running backend: starts the attempt, waits for the
//! provider redirect URL on stdin, then reconciles it and prints the signed-in user.
//!
//! Point `OAUTH2_SESSION_BASE_URL` at the backend (defaults to `http://localhost:8000`).

// std
use std::{io, sync::Arc};
// crates.io
use color_eyre::Result;
// self
use oauth2_session::{
	config::SessionConfig,
	navigate::Navigator,
	session::ReqwestSessionManager,
	store::FileStateStorage,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = SessionConfig::from_env()?;
	let storage =
		Arc::new(FileStateStorage::open(std::env::temp_dir().join("oauth2-session-demo.json"))?);
	let navigator: Arc<dyn Navigator> = {
		#[cfg(feature = "browser")]
		{
			Arc::new(oauth2_session::navigate::SystemBrowser)
		}
		#[cfg(not(feature = "browser"))]
		{
			Arc::new(oauth2_session::navigate::RecordingNavigator::default())
		}
	};
	let manager = ReqwestSessionManager::new(config, storage, navigator)?;

	let mut updates = manager.subscribe();

	tokio::spawn(async move {
		while updates.changed().await.is_ok() {
			println!("Session is now {}.", updates.borrow_and_update().phase());
		}
	});

	match manager.refresh_session().await {
		Ok(Some(user)) => {
			println!("Already signed in as {}.", user.label());

			return Ok(());
		},
		Ok(None) => {},
		Err(e) => eprintln!("Could not reach the backend: {e}"),
	}

	let url = manager.initiate_login().await?;

	println!("Authorize at {url}");
	println!("Paste the URL you were redirected to:");

	let mut line = String::new();

	io::stdin().read_line(&mut line)?;

	match manager.handle_callback_url(&Url::parse(line.trim())?).await? {
		Some(user) => println!("Signed in as {} ({}).", user.label(), user.handle),
		None => println!("{:?}", manager.callback_status()),
	}

	Ok(())
}
