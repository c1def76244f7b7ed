//! Terminal output: status lines and formatting helpers.
//!
//! Status lines go to stderr so stdout stays free for command output.
//!
//! ```no_run
//! use bale_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("dist/app.js (1.20 KB)");
//! ui::error("Failed to bundle src/app.js");
//! ```

mod format;
mod messages;

pub use format::{display_path, format_duration, format_size};
pub use messages::{error, info, success, warning};

use std::sync::atomic::{AtomicBool, Ordering};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var_os("CI").is_some()
        || std::env::var_os("GITHUB_ACTIONS").is_some()
        || std::env::var_os("GITLAB_CI").is_some()
        || std::env::var_os("CIRCLECI").is_some()
        || std::env::var_os("TRAVIS").is_some()
}

/// Check if colour output should be enabled.
///
/// Respects `NO_COLOR` and `FORCE_COLOR`, then falls back to whether stderr is
/// attended by a user. CI logs are rendered without colour.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    !is_ci() && console::user_attended_stderr()
}

/// Decide once whether status lines are coloured.
///
/// Call early in `main`; `no_color` comes from the `--no-color` flag.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
