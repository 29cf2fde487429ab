//! Stickyboard CLI - runs the shared sticky-note board server.

use std::path::Path;
use std::process;

use clap::Parser;
use stickyboard::cli::{Cli, Commands, ConfigCommands, ServeArgs};
use stickyboard::config::{
    ConfigOverrides, ResolvedConfig, ServerConfig, default_config_path, resolve_config,
};
use stickyboard::server::{ServerOptions, start_server};
use stickyboard::{Error, Result, logging};

fn main() {
    let cli = Cli::parse();

    let result = run_command(cli.command, cli.config_path.as_deref());

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(command: Option<Commands>, config_path: Option<&Path>) -> Result<()> {
    match command.unwrap_or_else(|| Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => serve(&args, config_path),
        Commands::Config { command } => match command {
            ConfigCommands::Show { kdl } => show_config(config_path, kdl),
            ConfigCommands::Path => {
                let path = default_config_path().ok_or_else(|| {
                    Error::Other("Could not determine the user config directory".to_string())
                })?;
                println!("{}", path.display());
                Ok(())
            }
        },
    }
}

fn overrides_from(args: &ServeArgs) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::new();
    if let Some(ref host) = args.host {
        overrides = overrides.with_host(host);
    }
    if let Some(port) = args.port {
        overrides = overrides.with_port(port);
    }
    if let Some(ref level) = args.log_level {
        overrides = overrides.with_log_level(level);
    }
    if let Some(format) = args.log_format {
        overrides = overrides.with_log_format(format);
    }
    if args.no_cors {
        overrides = overrides.with_cors_any(false);
    }
    overrides
}

fn serve(args: &ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(&overrides_from(args), config_path)?;
    logging::init_tracing(config.log_level(), config.log_format())?;
    log_resolved(&config);

    let options = ServerOptions::from_config(&config);
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?
        .block_on(start_server(&options))
}

fn log_resolved(config: &ResolvedConfig) {
    tracing::info!(
        host = config.host(),
        host_source = %config.host.source,
        port = config.port(),
        port_source = %config.port.source,
        cors_any = config.cors_any(),
        config_file = ?config.config_path,
        "starting stickyboard {}",
        env!("CARGO_PKG_VERSION")
    );
}

fn show_config(config_path: Option<&Path>, kdl: bool) -> Result<()> {
    let config = resolve_config(&ConfigOverrides::new(), config_path)?;
    if kdl {
        let effective = ServerConfig {
            host: Some(config.host().to_string()),
            port: Some(config.port()),
            log_level: Some(config.log_level().to_string()),
            log_format: Some(config.log_format()),
            cors_any: Some(config.cors_any()),
        };
        let mut doc = effective.to_kdl();
        doc.autoformat();
        print!("{}", doc);
    } else {
        println!("{}", serde_json::to_string_pretty(&config.to_json())?);
    }
    Ok(())
}
