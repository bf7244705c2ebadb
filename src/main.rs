//! KbQA - Q&A over a local plain-text knowledge base
//!
//! A CLI tool that uses Ollama with tool-calling to answer questions
//! strictly from the .txt documents in a knowledge directory.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, etc.)

mod agent;
mod cli;
mod config;
mod knowledge;
mod session;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use knowledge::KnowledgeBase;
use session::Session;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("KbQA v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the session
    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Session failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .kbqa.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".kbqa.toml");

    if path.exists() {
        eprintln!("⚠️  .kbqa.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .kbqa.toml")?;

    println!("✅ Created .kbqa.toml with default settings.");
    println!("   Edit it to customize model, knowledge directory, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run a complete Q&A session (one-shot or interactive).
async fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Resolve the knowledge base once; it is re-read on every tool call
    let knowledge_base = build_knowledge_base(&config)?;
    info!("Knowledge directory: {}", knowledge_base.dir().display());

    // Handle --show-kb: print the aggregated documents and exit
    if args.show_kb {
        return handle_show_kb(&knowledge_base);
    }

    // Initialize the agent
    println!("🤖 Initializing agent...");
    println!("   Model: {}", config.model.name);
    println!("   Ollama: {}", config.model.ollama_url);
    println!("   Knowledge: {}", knowledge_base.dir().display());

    let agent_config = agent::AgentConfig {
        ollama_url: config.model.ollama_url.clone(),
        model_name: config.model.name.clone(),
        temperature: config.model.temperature,
        max_iterations: config.model.max_iterations,
        timeout_seconds: config.model.timeout_seconds,
    };

    let mut agent = agent::DocumentAgent::new(agent_config, knowledge_base)?;
    let mut session = Session::new();
    info!("Started {}", session.id);

    if let Some(ref question) = args.question {
        // One-shot mode
        let answer = ask_with_spinner(&mut agent, question).await?;
        session.record(question.clone(), answer.clone());
        println!("\n{}", answer);
    } else {
        // Interactive mode
        run_interactive(&mut agent, &mut session).await?;
    }

    if !session.is_empty() {
        debug!("Session {} answered {} questions", session.id, session.len());
    }

    Ok(())
}

/// Interactive REPL: read questions from stdin until EOF or exit.
async fn run_interactive(agent: &mut agent::DocumentAgent, session: &mut Session) -> Result<()> {
    println!("\n💬 Ask questions about the knowledge base. Type 'exit' to quit.\n");

    let stdin = std::io::stdin();
    loop {
        print!("❓ ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match ask_with_spinner(agent, question).await {
            Ok(answer) => {
                session.record(question.to_string(), answer.clone());
                println!("\n{}\n", answer);
            }
            Err(e) => {
                warn!("Question failed: {}", e);
                eprintln!("\n⚠️  {}\n", e);
            }
        }
    }

    println!("\n👋 Session ended. {} questions answered.", session.len());
    Ok(())
}

/// Ask one question with a progress spinner while the model thinks.
async fn ask_with_spinner(agent: &mut agent::DocumentAgent, question: &str) -> Result<String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Thinking...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = agent.ask(question).await;

    spinner.finish_and_clear();
    result
}

/// Handle --show-kb: print the aggregated knowledge base, no LLM call.
fn handle_show_kb(knowledge_base: &KnowledgeBase) -> Result<()> {
    println!("📚 Knowledge base: {}\n", knowledge_base.dir().display());
    println!("{}", knowledge_base.tool_output());
    Ok(())
}

/// Build the knowledge base from config, falling back to the
/// executable-sibling `data` directory.
fn build_knowledge_base(config: &Config) -> Result<KnowledgeBase> {
    match config.knowledge.dir {
        Some(ref dir) => Ok(KnowledgeBase::new(
            PathBuf::from(dir),
            config.knowledge.sorted,
        )),
        None => KnowledgeBase::at_default_location(config.knowledge.sorted),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .kbqa.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
