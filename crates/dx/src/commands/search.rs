//! `dx search` command implementation.

use std::path::PathBuf;

use clap::Args;
use dx_config::{CliSettings, Config};
use dx_server::open_site;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the search command.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Text to search for.
    query: String,

    /// Search document bodies instead of titles.
    #[arg(long)]
    full: bool,

    /// Path to configuration file (default: auto-discover dx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,
}

impl SearchArgs {
    /// Execute the search command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the document root cannot
    /// be scanned.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = open_site(&config)?;
        let output = Output::stdout();

        if self.full {
            let hits = site.search_full(&self.query);
            for hit in &hits {
                output.highlight(&format!("{} ({})", hit.title, hit.path));
                output.detail(&format!("  {}", hit.snippet));
            }
            report_count(hits.len());
        } else {
            let hits = site.search_title(&self.query);
            for hit in &hits {
                output.highlight(&hit.title);
                output.detail(&format!("  {}", hit.path));
            }
            report_count(hits.len());
        }

        Ok(())
    }
}

fn report_count(count: usize) {
    let noun = if count == 1 { "match" } else { "matches" };
    Output::new().info(&format!("{count} {noun}"));
}
