mod builtin;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relayer_config::{load_common_env, ConfigResolver};
use relayer_core::{EnvType, Logger};
use relayer_logging::init_logger;
use relayer_plugins::PluginLoader;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "relayer")]
#[command(about = "Relayer host - loads the configured plugins and keeps them running")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every configured plugin and run until interrupted
    Run {
        /// Common env document (JSON, YAML or TOML)
        #[arg(short, long, default_value = "config/devnet/common.yaml")]
        config: PathBuf,
        /// Root directory of the plugin config documents
        #[arg(long, default_value = "config")]
        config_root: PathBuf,
        /// Override the environment tag from the common env
        #[arg(short, long)]
        env: Option<EnvType>,
    },
    /// Print the merged config a plugin would be constructed with
    ResolveConfig {
        /// Plugin name as declared by its module
        #[arg(short, long)]
        plugin: String,
        /// Reference the plugin is loaded from (defaults to the name)
        #[arg(short, long)]
        reference: Option<String>,
        #[arg(long, default_value = "config")]
        config_root: PathBuf,
        #[arg(short, long, default_value = "devnet")]
        env: EnvType,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            config_root,
            env,
        } => run(&config, config_root, env).await,
        Commands::ResolveConfig {
            plugin,
            reference,
            config_root,
            env,
        } => {
            init_logger("warn", None);
            let reference = reference.unwrap_or_else(|| plugin.clone());
            let resolved = ConfigResolver::from_dir(config_root)
                .resolve(&plugin, &reference, env)
                .await?;
            println!("{}", serde_json::to_string_pretty(resolved.values())?);
            Ok(())
        }
    }
}

async fn run(config_path: &Path, config_root: PathBuf, env_override: Option<EnvType>) -> Result<()> {
    let mut common_env = load_common_env(config_path)
        .await
        .with_context(|| format!("Failed to load common env from {}", config_path.display()))?;
    if let Some(env_type) = env_override {
        common_env.env_type = env_type;
    }

    init_logger(&common_env.log_level, common_env.log_dir.as_deref());
    info!(
        env_type = %common_env.env_type,
        plugins = common_env.plugin_uris.len(),
        config_root = %config_root.display(),
        "Starting relayer host"
    );

    let loader = PluginLoader::new(
        Arc::new(builtin::registry()),
        ConfigResolver::from_dir(config_root),
        Logger::base(),
    );

    // All plugins are required: a partial set is a startup failure.
    let plugins = match loader.load_all(Arc::new(common_env)).await {
        Ok(plugins) => plugins,
        Err(e) => {
            error!(
                reference = %e.reference(),
                stage = %e.stage(),
                error = %e,
                "Plugin load cycle failed; refusing to start"
            );
            return Err(e.into());
        }
    };

    for loaded in &plugins {
        info!(plugin = %loaded.plugin_name, reference = %loaded.reference, "Plugin active");
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!(count = plugins.len(), "Shutdown signal received; releasing plugins");
    drop(plugins);
    Ok(())
}
