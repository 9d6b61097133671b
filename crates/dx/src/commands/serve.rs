//! `dx serve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use dx_config::{CliSettings, Config};
use dx_server::{open_site, run_server, server_config_from_dx_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover dx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long, env = "DX_HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "DX_PORT")]
    port: Option<u16>,

    /// Enable verbose output (timing logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Rebuild when documents change on disk.
    #[arg(long)]
    watch: bool,

    /// Do not watch documents for changes.
    #[arg(long, conflicts_with = "watch")]
    no_watch: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the initial scan fails, or
    /// the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            watch: self.resolve_watch(),
            host: self.host,
            port: self.port,
            source_dir: self.source_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Source directory: {}",
            config.docs_resolved.source_dir.display()
        ));
        if config.update.enabled {
            output.info(&format!("Update command: {}", config.update.command.join(" ")));
        } else {
            output.info("Update command: disabled (rebuild only)");
        }
        if config.docs_resolved.watch {
            output.info("Watch: enabled");
        }

        let site = Arc::new(tokio::task::block_in_place(|| open_site(&config))?);
        output.info(&format!(
            "Loaded {} documents",
            site.state().document_count()
        ));

        let server_config = server_config_from_dx_config(&config, version.to_owned());
        run_server(server_config, site)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }

    /// Resolve watching from --watch/--no-watch flags.
    fn resolve_watch(&self) -> Option<bool> {
        if self.no_watch {
            Some(false)
        } else {
            self.watch.then_some(true)
        }
    }
}
