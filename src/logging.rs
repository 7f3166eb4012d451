//! Browser console logging for the `log` facade.

use log::Level;

/// Install the console logger and panic hook. Safe to call more than once.
pub fn init(level: Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("Logger already installed");
    }
}
