use anyhow::Context;
use colored::Colorize;
use streamify_server::{ServerConfig, StreamifyServer};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args, cli.verbose),
        Command::CheckConfig(args) => cmd_check_config(args, cli.format),
    }
}

fn init_tracing(config: &ServerConfig, verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        config.tracing_level()
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

fn cmd_serve(args: ServeArgs, verbose: bool) -> anyhow::Result<()> {
    let mut config = ServerConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.seed.is_some() {
        config.seed_users = args.seed;
    }
    init_tracing(&config, verbose);

    let server = StreamifyServer::new(config).context("building server")?;
    tracing::info!(users = server.store().user_count()?, "store ready");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_check_config(args: CheckConfigArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = ServerConfig::load(args.config.as_deref())?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Text => {
            println!("{} Configuration valid", "✓".green().bold());
            println!("  Bind: {}", config.bind_addr.to_string().bold());
            println!("  Environment: {}", config.environment.to_string().cyan());
            println!("  Log level: {}", config.log_level.yellow());
            println!("  Tokens: {}", config.auth.tokens.len());
            let mode = if config.social.use_transactions { "transactional" } else { "sequential" };
            println!("  Accept mode: {}", mode.cyan());
            println!("  Max page size: {}", config.social.max_page_size);
        }
    }
    Ok(())
}
