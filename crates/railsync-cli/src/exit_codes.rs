//! Exit codes for the railsync binary. A failed send never fails the build;
//! only local setup problems produce a non-zero exit.

pub const SUCCESS: i32 = 0;
/// Setup failed before reporting: unreadable results or invalid configuration.
pub const SETUP_ERROR: i32 = 2;
