use agent_runtime_app::{commands, logging, Config, Runtime};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Deterministic planning and tool execution runtime
#[derive(Parser)]
#[command(name = "agent-runtime", version, long_about = None)]
struct Cli {
    /// YAML config file (built-in tools and defaults when omitted)
    #[arg(long, global = true, env = "AGENT_RUNTIME_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan and execute an input, printing the rendered output
    Run {
        #[arg(required_unless_present = "plan")]
        input: Option<String>,

        /// Execute a serialized plan instead of planning an input
        #[arg(long, conflicts_with = "input")]
        plan: Option<PathBuf>,

        /// Print `{output, trace}` as JSON
        #[arg(long)]
        debug: bool,
    },

    /// Print the plan for an input without executing it
    Plan { input: String },

    /// Print the tool discovery document
    Tools,

    /// Run the canonical planning cases end to end
    SelfTest,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::resolve(cli.config.as_deref())?;
    logging::init(&config.log_filter);
    let runtime = Runtime::from_config(&config)?;

    match cli.command {
        Command::Run { input, plan, debug } => {
            commands::run::run(&runtime, input.as_deref(), plan.as_deref(), debug).await
        }
        Command::Plan { input } => commands::plan::run(&runtime, &input),
        Command::Tools => commands::tools::run(&runtime),
        Command::SelfTest => commands::self_test::run(&runtime).await,
    }
}
