//! Binary entrypoint: JSON request lines on stdin, JSON response lines on stdout.
//!
//! Usage: `insightlens [DATA_DIR]` (defaults to `$INSIGHTLENS_DATA_DIR`, then `.`).
//! Logs go to stderr; set `RUST_LOG` to adjust verbosity.

use insightlens_lib::commands::settings::load_effective_settings;
use insightlens_lib::protocol::handle_line;
use insightlens_lib::OverviewCache;
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let data_dir = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("INSIGHTLENS_DATA_DIR").ok())
        .unwrap_or_else(|| ".".to_string());

    let settings = match load_effective_settings(&data_dir) {
        Ok(s) => s,
        Err(e) => {
            log::error!("cannot load settings from {data_dir}: {e}");
            std::process::exit(1);
        }
    };
    let cache = OverviewCache::shared(settings.overview_cache_ttl);
    log::info!("serving engine requests from {data_dir}");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("read error: {e}");
                std::process::exit(1);
            }
        };

        if let Some(response) = handle_line(&line, &data_dir, &cache).await {
            let _ = writeln!(out, "{response}");
            let _ = out.flush();
        }
    }
}
