//! Auth-domain models: the backend's user identity, CSRF state helpers, and the provider's
//! redirect parameters.

pub mod callback;
pub mod csrf;
pub mod user;

pub use callback::*;
pub use csrf::*;
pub use user::*;
