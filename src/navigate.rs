//! Navigation hand-off used when login sends the user to the identity provider.

// self
use crate::{_prelude::*, error::BoxError};

/// Moves the user agent to the provider's authorization URL.
///
/// The hand-off is the last step of login initiation; once it succeeds the attempt continues
/// outside this process until the provider redirects back to the callback route.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Navigates to `url`.
	fn navigate(&self, url: &Url) -> Result<(), NavigationError>;
}

/// Failure reported by a [`Navigator`].
#[derive(Debug, ThisError)]
#[error("Failed to navigate to the authorization URL.")]
pub struct NavigationError {
	#[source]
	source: BoxError,
}
impl NavigationError {
	/// Wraps a navigator-specific failure.
	pub fn new(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self { source: Box::new(src) }
	}
}

/// Navigator that only remembers where it was asked to go.
///
/// Suits headless callers that print the URL themselves, and tests.
#[derive(Debug, Default)]
pub struct RecordingNavigator(Mutex<Vec<Url>>);
impl RecordingNavigator {
	/// Every URL navigated to, oldest first.
	pub fn visited(&self) -> Vec<Url> {
		self.0.lock().clone()
	}

	/// Most recent URL navigated to.
	pub fn last(&self) -> Option<Url> {
		self.0.lock().last().cloned()
	}
}
impl Navigator for RecordingNavigator {
	fn navigate(&self, url: &Url) -> Result<(), NavigationError> {
		self.0.lock().push(url.clone());

		Ok(())
	}
}

/// Navigator that opens the URL in the system's default browser.
#[cfg(feature = "browser")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemBrowser;
#[cfg(feature = "browser")]
impl Navigator for SystemBrowser {
	fn navigate(&self, url: &Url) -> Result<(), NavigationError> {
		open::that(url.as_str()).map_err(NavigationError::new)
	}
}
