//! Resolve a configuration file and print the effective settings as JSON.
//!
//! ```bash
//! cargo run --example resolve_config -- /etc/drachtio.conf.xml
//! ```

use anyhow::{bail, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: resolve_config <config-file>");
    };

    let config = drachtio_config::resolve(&path, false);
    if !config.is_valid() {
        bail!("configuration in {} is not valid", path);
    }

    config.log_summary();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
