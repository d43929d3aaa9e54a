//! Application-level log events shared by every entry point.

use tracing::{error, info, warn};

use crate::errors::SweepError;

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

/// Log an error with its code. User errors are logged as warnings.
pub fn log_app_error<E: SweepError>(error: &E) {
    if error.is_user_error() {
        warn!(
            event = "core.app.error_occurred",
            error_code = error.error_code(),
            error_message = %error,
            user_error = true
        );
    } else {
        error!(
            event = "core.app.error_occurred",
            error_code = error.error_code(),
            error_message = %error,
            user_error = false
        );
    }
}
