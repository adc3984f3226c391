//! Trippy Server Binary
//!
//! Standalone entry point - delegates to lib.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = trippy_core::config::load_config(&cwd)?;

    trippy_server::run_server(config).await
}
