use anyhow::{Result, anyhow};
use log::debug;
use tokio::runtime::Runtime;
use tokio::sync::OnceCell;

static GLOBAL_RUNTIME: OnceCell<Runtime> = OnceCell::const_new();

fn build_runtime() -> Result<Runtime> {
    let threads = std::cmp::max(num_cpus::get(), 2);
    debug!("Initializing global runtime with {} threads", threads);
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to build tokio runtime: {}", e))
}

/// The shared runtime for callers that arrive on foreign threads. Must not
/// be called from inside an async context.
pub fn init_global_runtime_blocking() -> Result<&'static Runtime> {
    if let Some(rt) = GLOBAL_RUNTIME.get() {
        return Ok(rt);
    }
    // Losing a race drops our runtime; the winner's is returned below.
    let _ = GLOBAL_RUNTIME.set(build_runtime()?);
    GLOBAL_RUNTIME
        .get()
        .ok_or_else(|| anyhow!("Global runtime unavailable"))
}
