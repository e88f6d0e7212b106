//! # rep
//!
//! Binary entry point for the Rep graph tool.
//!
//! ## Usage
//!
//! ```bash
//! rep new -n Scene -o scene.json
//! rep apply scene.json -u edits.json
//! rep validate scene.json --all
//! rep check scene.json --unreachable
//! rep order scene.json
//! rep walk scene.json -s <uuid> --mode dfs
//! rep decompose scene.json -o parts/
//! rep convert scene.json -o scene.rep
//! ```

use clap::Parser;
use rep::cli::{self, Cli};
use rep::config::RepConfig;
use rep::logging;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = Cli::parse();

    let config = RepConfig::load(&cli.config);
    let log_config = config
        .as_ref()
        .map(|c| c.log.clone())
        .unwrap_or_default();
    logging::init(&log_config, cli.verbose);

    let result = config.and_then(|config| cli::execute(cli, &config));
    if let Err(e) = result {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
