use crate::logging::{LogTarget, init_logger, parse_level};
use log::LevelFilter;

#[uniffi::export]
pub fn set_debug_log_level() {
    let _ = init_logger(LevelFilter::Trace, LogTarget::Stdout);
}

#[uniffi::export]
pub fn set_log_level(level: &str) -> bool {
    match parse_level(level) {
        Some(lvl) => init_logger(lvl, LogTarget::Stdout).is_ok(),
        None => false,
    }
}
