mod config;
mod error;

use std::fmt::Display;
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use runtime::{
    Agent, AnthropicBackend, Driver, EXIT_SENTINEL, ModelBackend, OpenAiBackend, PromptedBackend,
    Session,
};
use tools::{Executor, ToolRegistry};
use tracing_subscriber::EnvFilter;

use config::{Config, Provider};
use error::Result;

const CONFIG_FILE: &str = "autodev.toml";

#[derive(Parser)]
#[command(name = "autodev")]
#[command(about = "A console assistant that develops web applications with local tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./autodev.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model provider
    #[arg(long, global = true, value_enum)]
    provider: Option<Provider>,

    /// Model name
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// System prompt file
    #[arg(long, global = true)]
    system_prompt: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// List the tools offered to the model
    Tools,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }

    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Chat) | None => cmd_chat(config).await,
        Some(Commands::Tools) => cmd_tools(&config),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// File, then environment, then flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None if std::path::Path::new(CONFIG_FILE).exists() => Config::load(CONFIG_FILE)?,
        None => Config::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;

    if let Some(provider) = cli.provider {
        if provider != config.backend.provider {
            config.backend.provider = provider;
            config.backend.api_key = std::env::var(provider.key_var()).ok();
        }
    }
    if let Some(model) = &cli.model {
        config.backend.model = Some(model.clone());
    }
    if let Some(path) = &cli.system_prompt {
        config.agent.system_prompt_file = path.clone();
    }

    Ok(config)
}

async fn cmd_chat(config: Config) -> Result<()> {
    config.validate()?;
    let backend = &config.backend;

    match backend.provider {
        Provider::Anthropic => {
            let auth = config.anthropic_auth()?;
            tracing::debug!(%auth, "anthropic credentials");
            let mut builder = AnthropicBackend::builder(auth, backend.model())
                .max_tokens(backend.max_tokens)
                .temperature(backend.temperature);
            if let Some(url) = &backend.base_url {
                builder = builder.base_url(url);
            }
            chat(&config, builder.build()).await
        }
        Provider::OpenAi => {
            let mut builder = OpenAiBackend::builder(config.api_key()?, backend.model())
                .max_tokens(backend.max_tokens)
                .temperature(backend.temperature);
            if let Some(url) = &backend.base_url {
                builder = builder.base_url(url);
            }
            chat(&config, builder.build()).await
        }
    }
}

async fn chat<M: ModelBackend + Display>(config: &Config, model: M) -> Result<()> {
    let registry = ToolRegistry::builtin(&config.tools)?;
    let executor = Executor::new(registry, &config.tools);
    let system = config.system_prompt()?;

    println!("autodev v{}", env!("CARGO_PKG_VERSION"));
    println!("Model: {model}");
    println!("Project: {}", config.tools.base_path.display());
    println!("Type '{EXIT_SENTINEL}' to exit.\n");

    let backend = PromptedBackend::new(model, config.backend.timeout());
    let agent = Agent::new(backend, executor, config.agent.limits());
    let mut driver = Driver::new(Session::new(agent).with_system(system));

    driver.run(io::stdin().lock(), io::stdout()).await?;
    tracing::info!(
        turns = driver.session().transcript().assistant_turns(),
        "session ended"
    );
    Ok(())
}

fn cmd_tools(config: &Config) -> Result<()> {
    let registry = ToolRegistry::builtin(&config.tools)?;
    for spec in registry.describe() {
        println!("{}", spec.name);
        println!("    {}", spec.description);
        for field in &spec.fields {
            println!("    - {} ({:?}): {}", field.name, field.ty, field.description);
        }
    }
    Ok(())
}
