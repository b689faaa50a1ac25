// ============================================================================
// profile-dir — CLI for the featured members directory
// ============================================================================
// Usage:
//   profile-dir stats                            Show directory statistics
//   profile-dir list                             List profiles in store order
//   profile-dir show --id <id>                   Show one profile as JSON
//   profile-dir delete --id <id>                 Remove one profile
//   profile-dir seed --count 25                  Insert generated profiles
//   profile-dir import --file members.json       Insert profiles from JSON
//   profile-dir export --format json             Export the directory as JSON
//   profile-dir browse --viewer uid-3 --clicks 2 Walk the paging/gating flow
//   profile-dir config                           Print the effective config
// ============================================================================

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use directory_core::{
    BrowseController, DirectoryConfig, DirectorySnapshot, GestureOutcome, Navigator,
    ProfileRecord, RedbProfileStore, Viewer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const SAMPLE_NAMES: &[&str] = &[
    "Aarav Sharma", "Diya Patel", "Kabir Mehta", "Ananya Iyer", "Rohan Gupta",
    "Ishita Nair", "Vihaan Reddy", "Saanvi Joshi", "Arjun Menon", "Meera Kapoor",
];

const SAMPLE_OCCUPATIONS: &[&str] = &[
    "Software Engineer", "Doctor", "Architect", "Teacher", "Chartered Accountant",
];

/// Featured members directory tool
#[derive(Parser)]
#[command(
    name = "profile-dir",
    version,
    about = "Manage and browse the featured members directory"
)]
struct Cli {
    /// Path to the database file (default: ~/.profile-dir/profiles.redb)
    #[arg(long, global = true)]
    db_path: Option<String>,

    /// JSON config file with page sizes, allowance and redirect paths
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show directory statistics
    Stats,

    /// List all profiles in store order
    List,

    /// Show one profile as JSON
    Show {
        #[arg(long)]
        id: String,
    },

    /// Remove one profile; open cursors keep paging past it
    Delete {
        #[arg(long)]
        id: String,
    },

    /// Insert generated sample profiles
    Seed {
        /// Number of profiles to insert
        #[arg(long, default_value = "25")]
        count: usize,

        /// Owner uid prefix; profile i is owned by PREFIX-i
        #[arg(long, default_value = "uid")]
        owner: String,
    },

    /// Insert profiles from a JSON array file
    Import {
        #[arg(long)]
        file: PathBuf,
    },

    /// Export full directory contents as JSON
    Export {
        /// Output format (currently only json is supported)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Load the first page, then press "load more" a number of times
    Browse {
        /// Viewer identity; omit to browse as a guest
        #[arg(long)]
        viewer: Option<String>,

        /// Number of "load more" clicks
        #[arg(long, default_value = "1")]
        clicks: usize,
    },

    /// Print the effective configuration
    Config,
}

/// Prints redirects instead of routing
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, path: &str) {
        println!("-> redirect to {}", path);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("directory_core=info".parse()?)
                .add_directive("profile_dir=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DirectoryConfig::load(cli.config.as_deref())?;

    if let Commands::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let store = RedbProfileStore::open(cli.db_path.as_deref())?;

    match cli.command {
        Commands::Stats => cmd_stats(&store),
        Commands::List => cmd_list(&store),
        Commands::Show { id } => cmd_show(&store, &id),
        Commands::Delete { id } => cmd_delete(&store, &id),
        Commands::Seed { count, owner } => cmd_seed(&store, count, &owner),
        Commands::Import { file } => cmd_import(&store, &file),
        Commands::Export { format } => cmd_export(&store, &format),
        Commands::Browse { viewer, clicks } => cmd_browse(store, config, viewer, clicks).await,
        Commands::Config => Ok(()),
    }
}

fn cmd_stats(store: &RedbProfileStore) -> Result<()> {
    let stats = store.stats()?;

    println!("=== Featured Members Directory ===");
    println!("Database: {}", store.path().display());
    println!();
    println!("Profiles:     {}", stats.total_profiles);
    println!("  with owner  {}", stats.owned_profiles);
    println!("  with image  {}", stats.profiles_with_images);

    Ok(())
}

fn cmd_list(store: &RedbProfileStore) -> Result<()> {
    let profiles = store.list_profiles()?;

    if profiles.is_empty() {
        println!("No profiles found.");
        return Ok(());
    }

    println!("{:<38}  {:<24}  {:<22}  {}", "ID", "NAME", "OCCUPATION", "OWNER");
    println!("{}", "-".repeat(100));

    for profile in &profiles {
        println!(
            "{:<38}  {:<24}  {:<22}  {}",
            profile.id,
            truncate(&profile.full_name, 24),
            truncate(profile.display_occupation(), 22),
            profile.uid.as_deref().unwrap_or("-")
        );
    }

    println!("\nTotal: {} profiles", profiles.len());
    Ok(())
}

fn cmd_show(store: &RedbProfileStore, id: &str) -> Result<()> {
    match store.get_profile(id)? {
        Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
        None => println!("Profile not found: {}", id),
    }
    Ok(())
}

fn cmd_delete(store: &RedbProfileStore, id: &str) -> Result<()> {
    if store.delete_profile(id)? {
        info!("Deleted profile {}", id);
        println!("Deleted profile {}", id);
    } else {
        println!("Profile not found: {}", id);
    }
    Ok(())
}

fn cmd_seed(store: &RedbProfileStore, count: usize, owner: &str) -> Result<()> {
    for i in 0..count {
        let profile = ProfileRecord::new(
            uuid::Uuid::new_v4().to_string(),
            SAMPLE_NAMES[i % SAMPLE_NAMES.len()],
        )
        .with_occupation(SAMPLE_OCCUPATIONS[i % SAMPLE_OCCUPATIONS.len()])
        .with_owner(format!("{}-{}", owner, i));
        store.insert_profile(&profile)?;
    }

    info!("Seeded {} profiles", count);
    println!(
        "Inserted {} profiles (owners {}-0 .. {}-{})",
        count,
        owner,
        owner,
        count.saturating_sub(1)
    );
    Ok(())
}

fn cmd_import(store: &RedbProfileStore, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| anyhow!("Failed to read {}: {}", file.display(), e))?;
    let profiles: Vec<ProfileRecord> = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("Failed to parse {}: {}", file.display(), e))?;

    for profile in &profiles {
        store.insert_profile(profile)?;
    }

    println!("Imported {} profiles from {}", profiles.len(), file.display());
    Ok(())
}

fn cmd_export(store: &RedbProfileStore, format: &str) -> Result<()> {
    if format != "json" {
        anyhow::bail!("Unsupported format '{}'. Only 'json' is supported.", format);
    }

    let profiles = store.list_profiles()?;
    let stats = store.stats()?;

    let export = serde_json::json!({
        "exported_at": Utc::now().to_rfc3339(),
        "stats": stats,
        "profiles": profiles,
    });

    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}

async fn cmd_browse(
    store: RedbProfileStore,
    config: DirectoryConfig,
    viewer: Option<String>,
    clicks: usize,
) -> Result<()> {
    let viewer = viewer.map(Viewer::authenticated).unwrap_or_default();
    println!("Browsing as {}", viewer);

    let controller =
        BrowseController::new(Arc::new(store), Arc::new(ConsoleNavigator), config, viewer);

    let outcome = controller.load_initial().await;
    print_step("initial", &outcome, &controller.snapshot().await);

    for click in 1..=clicks {
        let outcome = controller.request_more().await;
        print_step(&format!("load more #{}", click), &outcome, &controller.snapshot().await);
        if matches!(outcome, GestureOutcome::Redirected(_)) {
            break;
        }
    }

    Ok(())
}

fn print_step(label: &str, outcome: &GestureOutcome, snapshot: &DirectorySnapshot) {
    let result = match outcome {
        GestureOutcome::Loaded { appended, exhausted } => {
            format!("loaded {} (exhausted: {})", appended, exhausted)
        }
        GestureOutcome::Redirected(target) => format!("redirected to {}", target.display_name()),
        GestureOutcome::Ignored(reason) => format!("ignored ({:?})", reason),
        GestureOutcome::Failed(e) if e.is_transient() => format!("failed, retry later: {}", e),
        GestureOutcome::Failed(e) => format!("failed: {}", e),
        GestureOutcome::Discarded => "discarded".to_string(),
    };

    println!("\n[{}] {}", label, result);
    println!(
        "  members: {}  usage: {}  button: {}",
        snapshot.members.len(),
        snapshot.usage,
        snapshot.load_more_text().unwrap_or("(hidden)")
    );
    for card in snapshot.cards() {
        println!("  - {:<24} {:<22} {}", truncate(&card.full_name, 24), card.occupation, card.href);
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
