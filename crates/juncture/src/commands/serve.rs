//! `juncture serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use juncture_config::{CliSettings, Config};
use juncture_server::{run_server, server_config_from_juncture_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover juncture.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config, default 8000).
    #[arg(short, long, env = "JUNCTURE_PORT")]
    port: Option<u16>,

    /// Rendering service endpoint (overrides config).
    #[arg(long, env = "JUNCTURE_API")]
    api: Option<String>,

    /// Client script bundle URL (overrides config).
    #[arg(long)]
    wc: Option<String>,

    /// Client bundle version to pin, or "latest" (overrides config).
    #[arg(long)]
    wc_version: Option<String>,

    /// Content repository (`owner/repo`) or local mirror path (overrides config).
    #[arg(long, env = "JUNCTURE_CONTENT")]
    content: Option<String>,

    /// Enable verbose output (log every upstream request).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Build CLI settings from args.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            content: self.content.clone(),
            render_endpoint: self.api.clone(),
            script_endpoint: self.wc.clone(),
            version: self.wc_version.clone(),
        }
    }

    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        let content = match &config.content_resolved.local_dir {
            Some(dir) => format!("{} (local)", dir.display()),
            None => config.content_resolved.identifier.clone(),
        };
        output.banner(
            &format!(
                "Starting server on {}:{}",
                config.server.host, config.server.port
            ),
            &[
                ("Render endpoint", config.render.endpoint.clone()),
                ("Script endpoint", config.assets.script_endpoint.clone()),
                ("Bundle version", config.assets.version.clone()),
                ("Content", content),
            ],
        );
        if config.search.key.is_empty() {
            tracing::warn!("search.key is not set, /search will be rejected upstream");
        }

        let server_config = server_config_from_juncture_config(&config);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
