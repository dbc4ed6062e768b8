//! Shopkeep server entry point

use anyhow::Context;
use shopkeep::{
    api::routes::{build_app, ROUTES},
    cli::{output::Output, Cli, Commands},
    data::DataSources,
    utils::config::{Config, LogFormat},
    AppState, OpenAIClient, ToolRegistry,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(&cli, &output).await {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, output: &Output) -> anyhow::Result<()> {
    let config_found = cli.config.exists();
    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(format) = cli.log_format {
        config.server.log_format = format;
    }
    if cli.verbose {
        config.server.log_level = "debug".to_string();
    }
    config.validate().context("Invalid configuration")?;

    match cli.command() {
        Commands::Serve => serve(config, config_found, cli, output).await,
        Commands::Tools { retail } => print_tools(&config, retail),
        Commands::Config => print_config(&config, cli, output),
    }
}

async fn serve(config: Config, config_found: bool, cli: &Cli, output: &Output) -> anyhow::Result<()> {
    init_tracing(&config);
    output.banner();

    if !config_found {
        tracing::warn!(path = %cli.config.display(), "config file not found, using defaults");
        output.warning(&format!(
            "{} not found, running on defaults",
            cli.config.display()
        ));
    }
    if config.llm.api_key.is_none() {
        tracing::warn!(
            env_var = %config.llm.api_key_env,
            "no API key set; model calls will be rejected upstream"
        );
        output.warning(&format!(
            "{} is not set; chat requests will fail upstream",
            config.llm.api_key_env
        ));
    }

    let llm = Arc::new(OpenAIClient::from_config(&config.llm)?);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %config.llm.model,
        api_base = %config.llm.api_base,
        "starting server"
    );

    output.kv("Model", &config.llm.model);
    output.kv("Max tool iterations", &config.agent.max_iterations.to_string());
    for (method, path) in ROUTES {
        output.endpoint(method, path);
    }

    let state = AppState::new(config, llm);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    output.success(&format!("Listening on http://{}", addr));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn print_tools(config: &Config, retail: bool) -> anyhow::Result<()> {
    let sources = DataSources::from_config(&config.data);
    let registry = if retail {
        ToolRegistry::retail(&sources, &config.tools)
    } else {
        ToolRegistry::general(&sources, &config.tools)
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&registry.get_tool_definitions())?
    );
    Ok(())
}

fn print_config(config: &Config, cli: &Cli, output: &Output) -> anyhow::Result<()> {
    output.header("Configuration");
    output.kv("File", &cli.config.display().to_string());
    output.kv(
        "API key",
        if config.llm.api_key.is_some() {
            "set (redacted)"
        } else {
            "not set"
        },
    );
    println!();
    println!("{}", config.to_toml()?);
    if !cli.config.exists() {
        output.hint("No config file found; values above are defaults plus environment overrides.");
    }
    Ok(())
}

fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.server.log_level;
        format!("shopkeep={level},shopkeep_server={level},tower_http={level}").into()
    });

    let fmt_layer = match config.server.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
}
