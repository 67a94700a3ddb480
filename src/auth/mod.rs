// Lifevault — Auth Module
//
// Registration, password login, PIN-gated emergency access, credential
// changes, and the rolling-window lockout policy over the failed-attempt
// log.

mod error;
mod lockout;
mod service;

pub use error::AuthError;
pub use lockout::{AttemptTracker, LockStatus, LOCKOUT_THRESHOLD, LOCKOUT_WINDOW_HOURS};
pub use service::AuthService;
