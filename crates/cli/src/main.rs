//! burrow CLI — the main entry point.
//!
//! One positional prompt, one optional `--verbose` flag. Exit codes:
//! 0 on a final answer, 2 when the round budget is exhausted, 1 on a
//! transport-level failure.

use std::sync::Arc;

use burrow_agent::{AgentLoop, LoopOutcome};
use burrow_config::AppConfig;
use burrow_providers::GeminiProvider;
use burrow_sandbox::WorkspaceRoot;
use clap::Parser;
use tracing::info;

const SYSTEM_INSTRUCTION: &str = "\
You are a helpful AI coding agent.

When the user asks a question or makes a request, make a function call plan. \
You can perform the following operations:

- List files and directories
- Read file contents
- Write or overwrite files
- Run Python files with optional arguments

All paths you provide should be relative to the working directory. You do not \
need to specify the working directory in your function calls as it is \
automatically injected for security reasons.";

/// Exit code when the round budget is exhausted without a final answer.
const EXIT_ROUNDS_EXHAUSTED: i32 = 2;

#[derive(Parser)]
#[command(
    name = "burrow",
    about = "A sandboxed command-line coding agent",
    version
)]
struct Cli {
    /// The prompt to hand to the agent
    user_prompt: String,

    /// Enable verbose per-round diagnostics
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for the credential early — give a clear error
    let Some(api_key) = config.api_key.clone() else {
        return Err(
            "GEMINI_API_KEY not found in environment. \
             Export it or add api_key to burrow.toml."
                .into(),
        );
    };

    // The workspace root is fixed for the whole session
    std::fs::create_dir_all(&config.workspace_dir)
        .map_err(|e| format!("Failed to create workspace directory: {e}"))?;
    let root = WorkspaceRoot::new(&config.workspace_dir)?;
    info!(root = %root.path().display(), "Workspace root ready");

    let tools = Arc::new(burrow_tools::workspace_registry(&root));
    let provider = Arc::new(GeminiProvider::new(api_key));

    let agent = AgentLoop::new(
        provider,
        &config.model,
        config.temperature,
        SYSTEM_INSTRUCTION,
        tools,
    )
    .with_max_rounds(config.max_rounds)
    .with_verbose(cli.verbose);

    if cli.verbose {
        println!("User prompt: {}", cli.user_prompt);
    }

    match agent.run(&cli.user_prompt).await? {
        LoopOutcome::Done(text) => {
            if cli.verbose {
                println!("Response:");
            }
            println!("{text}");
        }
        LoopOutcome::Aborted => {
            eprintln!(
                "Maximum iterations ({}) reached without a final answer.",
                config.max_rounds
            );
            std::process::exit(EXIT_ROUNDS_EXHAUSTED);
        }
    }

    Ok(())
}
