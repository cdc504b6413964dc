use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use onboarding_intel::config::PipelineConfig;
use onboarding_intel::curriculum::AssignmentStatus;
use onboarding_intel::onboarding::{Catalog, OnboardingManager};
use onboarding_intel::pipeline::SkillDirection;
use onboarding_intel::store::{Database, LibSqlBackend};

#[derive(Debug, Parser)]
#[command(name = "onboarding-intel")]
#[command(version, about = "Learner onboarding: classification, matching, curriculum and repair")]
struct Cli {
    /// Database path (overrides ONBOARD_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify free text into a learning direction
    Classify { text: String },
    /// Infer skill level and goal for a direction
    Analyze {
        text: String,
        /// Direction label, e.g. "Data Science" (classified from text if omitted)
        #[arg(long)]
        direction: Option<String>,
    },
    /// Store a learner's free-text learning direction
    Submit { user: String, text: String },
    /// Pick and store a mentor for a learner
    AssignMentor { user: String },
    /// Generate the starter curriculum for a learner
    Curriculum { user: String },
    /// Move a curriculum assignment forward (assigned, in_progress, completed)
    Progress {
        user: String,
        item: Uuid,
        status: AssignmentStatus,
    },
    /// Where should this navigation go?
    Gate {
        path: String,
        #[arg(long)]
        user: Option<String>,
    },
    /// Repair every incomplete profile
    Repair {
        /// Users processed at once (overrides ONBOARD_REPAIR_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Load mentors and curriculum items from a JSON catalog file
    Seed { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    // Pure commands never touch the database.
    match &cli.command {
        Commands::Classify { text } => {
            let result = onboarding_intel::pipeline::classify_intent(text);
            return print_json(&result);
        }
        Commands::Analyze { text, direction } => {
            let direction = match direction {
                Some(label) => SkillDirection::from_label(label)
                    .ok_or_else(|| anyhow!("unknown direction: {label}"))?,
                None => onboarding_intel::pipeline::classify_intent(text)
                    .detected_domain
                    .unwrap_or(SkillDirection::Other),
            };
            let analysis = onboarding_intel::pipeline::analyze_skill_level(text, direction);
            return print_json(&analysis);
        }
        _ => {}
    }

    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("opening database at {}", config.db_path.display()))?,
    );
    let manager = OnboardingManager::from_config(db, &config);

    match cli.command {
        Commands::Classify { .. } | Commands::Analyze { .. } => {}
        Commands::Submit { user, text } => {
            let submission = manager.submit_learning_direction(&user, &text).await?;
            print_json(&submission)?;
        }
        Commands::AssignMentor { user } => match manager.assign_mentor(&user).await? {
            Some(result) => print_json(&result)?,
            None => eprintln!("No active mentors available"),
        },
        Commands::Curriculum { user } => {
            let plan = manager.generate_curriculum(&user).await?;
            print_json(&plan)?;
        }
        Commands::Progress { user, item, status } => {
            let assignment = manager.update_curriculum_progress(&user, item, status).await?;
            print_json(&assignment)?;
        }
        Commands::Gate { path, user } => {
            let decision = manager.check_onboarding_gate(user.as_deref(), &path).await?;
            print_json(&decision)?;
        }
        Commands::Repair { concurrency } => {
            let run = manager
                .run_retroactive_repair(concurrency.unwrap_or(config.repair_concurrency))
                .await?;
            print_json(&run)?;
        }
        Commands::Seed { file } => {
            let catalog = Catalog::load(&file)?;
            let summary = manager.seed_catalog(&catalog).await?;
            print_json(&summary)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
