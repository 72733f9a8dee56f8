//! CLI command implementations.

pub mod create;
pub mod deploy;
pub mod status;

use zdd::config::ConfigWarning;

pub fn print_config_warnings(warnings: &[ConfigWarning]) {
    for w in warnings {
        eprintln!("⚠ Unknown config key '{}' in {}", w.key, w.file.display());
        if let Some(suggestion) = &w.suggestion {
            eprintln!("   Did you mean '{}'?", suggestion);
        }
    }
}
