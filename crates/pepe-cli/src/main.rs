use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod repl;

use app::AppContext;
use commands::profile::ProfileUpdate;

#[derive(Parser)]
#[command(name = "pepe")]
#[command(about = "Pepe - guided, resumable workout sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage workout plans
    Plans {
        #[command(subcommand)]
        action: PlansAction,
    },
    /// Print the coach timeline of a plan
    Timeline {
        plan_id: String,
        /// Print the timeline as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play the coach timeline of a plan through the console
    Listen { plan_id: String },
    /// Start a live session for a plan
    Run { plan_id: String },
    /// Resume the stored session
    Resume,
    /// Delete the stored session without saving it
    Discard,
    /// List completed sessions
    History,
    /// Show weekly consistency, volume and personal records
    Stats,
    /// Show or edit the training profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum PlansAction {
    /// List all plans
    List,
    /// Show the sets of one plan
    Show { plan_id: String },
    /// Add the demo plans
    Seed,
    /// Delete a plan
    Delete { plan_id: String },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the profile
    Show,
    /// Update profile fields
    Set(ProfileUpdate),
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (paths, config) = AppContext::config()?;
    init_tracing(&config.logging.level);
    let ctx = AppContext::open(&paths, config);

    match cli.command {
        Commands::Plans { action } => match action {
            PlansAction::List => commands::plans::list(&ctx).await?,
            PlansAction::Show { plan_id } => commands::plans::show(&ctx, &plan_id).await?,
            PlansAction::Seed => commands::plans::seed(&ctx).await?,
            PlansAction::Delete { plan_id } => commands::plans::delete(&ctx, &plan_id).await?,
        },
        Commands::Timeline { plan_id, json } => commands::timeline::print(&ctx, &plan_id, json).await?,
        Commands::Listen { plan_id } => commands::timeline::listen(&ctx, &plan_id).await?,
        Commands::Run { plan_id } => commands::session::run(&ctx, &plan_id).await?,
        Commands::Resume => commands::session::resume(&ctx).await?,
        Commands::Discard => commands::session::discard(&ctx).await?,
        Commands::History => commands::history::list(&ctx).await?,
        Commands::Stats => commands::history::stats(&ctx).await?,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&ctx).await?,
            ProfileAction::Set(update) => commands::profile::set(&ctx, update).await?,
        },
    }

    Ok(())
}
