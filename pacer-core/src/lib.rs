pub mod db;
pub mod logging;
pub mod plan;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod timer;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
#[cfg(feature = "uniffi")]
pub mod uniffi_interface;
