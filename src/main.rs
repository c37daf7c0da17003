//! kiln - build and serve static web assets.

mod asset;
mod build;
mod cli;
mod compiler;
mod config;
mod core;
mod logger;
mod plugin;
mod template;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use cli::serve::{ServeContext, bind_server};
use compiler::NativeCompiler;
use config::KilnConfig;
use template::{TemplateCache, TrustedFs};
use watch::WatchHandle;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = Arc::new(KilnConfig::load(&cli)?);
    if let Some(path) = &config.config_path {
        debug!("config"; "loaded {}", path.display());
    }

    let watch = if cli.runs_build() {
        build_assets(&cli, &config)?
    } else {
        None
    };

    if !cli.serves() {
        stop_watch(watch);
        log!("build"; "built static assets in {}", config.src_dir().display());
        return Ok(());
    }

    let result = serve(&cli, config);
    stop_watch(watch);
    result
}

/// Run the asset build; in dev mode the returned session keeps rebuilding.
fn build_assets(cli: &Cli, config: &KilnConfig) -> Result<Option<Arc<WatchHandle>>> {
    let mut orchestrator = build::Orchestrator::new(Arc::new(NativeCompiler::new()));
    for plugin in config.stub_plugins()? {
        orchestrator = orchestrator.with_plugin(plugin);
    }

    let handle = orchestrator.build(&config.build_config(cli.dev))?;
    Ok(handle.map(|handle| {
        let handle = Arc::new(handle);
        core::register_watch(Arc::clone(&handle));
        handle
    }))
}

fn serve(cli: &Cli, config: Arc<KilnConfig>) -> Result<()> {
    let templates = Arc::new(TemplateCache::new(
        TrustedFs::new(config.src_dir()),
        config.layout(),
    ));

    // Production parses once; fail now rather than on the first request.
    if !cli.dev {
        templates
            .resolve(&config.serve.index, false)
            .with_context(|| format!("failed to load page templates from {}", config.src_dir().display()))?;
    }

    let server = bind_server(&config)?;
    server.run(Arc::new(ServeContext::new(config, templates, cli.dev)))
}

fn stop_watch(watch: Option<Arc<WatchHandle>>) {
    if let Some(handle) = watch {
        handle.cancel();
        handle.wait();
    }
}
