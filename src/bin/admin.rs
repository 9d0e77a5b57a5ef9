//! CLI administration tool for space-bio-engine.
//!
//! Provides storage checks, schema migrations and catalog maintenance
//! without going through the dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Check that the publications collection is reachable
//! cargo run --bin admin -- db check
//!
//! # Create the PostgreSQL schema
//! cargo run --bin admin -- db migrate
//!
//! # List publications, optionally filtered
//! cargo run --bin admin -- publications list --species Plants --year-min 2020
//!
//! # Delete a publication
//! cargo run --bin admin -- publications delete 6f1c1d2e-8a51-4d8e-9a57-0c0a4b1a2f10
//!
//! # Import a JSON export (current or project schema)
//! cargo run --bin admin -- import publications.json
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see [`space_bio_engine::config`].

use space_bio_engine::api::dto::filter::FilterParams;
use space_bio_engine::application::services::PublicationService;
use space_bio_engine::config::{self, Config, StorageBackend};
use space_bio_engine::domain::entities::{NewPublication, legacy};
use space_bio_engine::domain::store::{DataClient, StoreError};
use space_bio_engine::infrastructure::{build_store, connect_pool, run_migrations};
use space_bio_engine::utils::text::excerpt;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::path::PathBuf;
use tokio::sync::broadcast;
use uuid::Uuid;

/// CLI tool for managing space-bio-engine.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Storage operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Manage catalog publications
    Publications {
        #[command(subcommand)]
        action: PublicationAction,
    },

    /// Import publications from a JSON array export
    Import {
        /// Path to the export file
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Storage subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check that the publications collection is reachable
    Check,

    /// Apply schema migrations (PostgreSQL backend)
    Migrate,
}

/// Publication subcommands.
#[derive(Subcommand)]
enum PublicationAction {
    /// List publications, newest first
    List {
        /// Species facet (repeatable)
        #[arg(long)]
        species: Vec<String>,

        /// Mission facet (repeatable)
        #[arg(long)]
        missions: Vec<String>,

        /// Earliest publication year
        #[arg(long)]
        year_min: Option<i32>,

        /// Latest publication year
        #[arg(long)]
        year_max: Option<i32>,
    },

    /// Delete a publication by id
    Delete {
        id: Uuid,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &config).await?,
        Commands::Publications { action } => {
            handle_publication_action(action, &config).await?
        }
        Commands::Import { file, yes } => import(&config, file, yes).await?,
    }

    Ok(())
}

/// Builds the catalog service. Migrations only run through `db migrate`.
async fn service(config: &Config) -> Result<PublicationService> {
    let config = Config {
        db_run_migrations: false,
        ..config.clone()
    };
    let store = build_store(&config).await?;
    let (events, _) = broadcast::channel(16);
    Ok(PublicationService::new(DataClient::new(store), events))
}

/// Dispatches storage commands.
async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => check_storage(config).await,
        DbAction::Migrate => migrate(config).await,
    }
}

/// Checks the publications collection.
///
/// # Output
///
/// - Missing table: setup hint pointing at `admin db migrate`
/// - Any other failure: the store error
/// - Success: backend name and number of stored publications
async fn check_storage(config: &Config) -> Result<()> {
    println!("{}", "🔍 Checking storage setup...".bright_blue().bold());
    println!();
    println!("  Backend: {}", config.storage_backend.to_string().cyan());

    let service = service(config).await?;

    match service.check_storage().await {
        Err(StoreError::MissingCollection(relation)) => {
            println!(
                "{}",
                format!("❌ Table \"{relation}\" does not exist").red().bold()
            );
            println!();
            println!(
                "  Create it with: {} admin db migrate",
                "cargo run --bin".bright_cyan()
            );
            anyhow::bail!("storage is not set up");
        }
        Err(e) => {
            println!("{}", format!("❌ Storage error: {e}").red().bold());
            anyhow::bail!(e);
        }
        Ok(()) => {}
    }

    let total = service
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read publications: {}", e))?;

    println!("{}", "✅ Storage is properly configured".green().bold());
    println!(
        "  Publications: {}",
        total.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Applies the embedded migrations.
async fn migrate(config: &Config) -> Result<()> {
    if config.storage_backend != StorageBackend::Postgres {
        println!(
            "{}",
            "⚠️  Local storage backend has no schema to migrate".yellow()
        );
        return Ok(());
    }

    println!("{}", "🛠  Applying migrations...".bright_blue().bold());

    let pool = connect_pool(config).await?;
    run_migrations(&pool).await?;

    println!("{}", "✅ Migrations applied".green().bold());
    Ok(())
}

/// Dispatches publication commands.
async fn handle_publication_action(action: PublicationAction, config: &Config) -> Result<()> {
    match action {
        PublicationAction::List {
            species,
            missions,
            year_min,
            year_max,
        } => {
            let params = FilterParams {
                species,
                missions,
                year_min,
                year_max,
                seq: None,
            };
            list_publications(config, params).await
        }
        PublicationAction::Delete { id, yes } => delete_publication(config, id, yes).await,
    }
}

/// Lists publications matching the given facets.
///
/// # Output Format
///
/// ```text
/// 📋 Publications
///
///   ID        Year  Title                                     Species / Missions
///   ────────────────────────────────────────────────────────────────────────────
///   6f1c1d2e  2021  Plant root growth in microgravity         Plants / ISS
/// ```
async fn list_publications(config: &Config, params: FilterParams) -> Result<()> {
    let filter = params.to_filter_state()?;
    let service = service(config).await?;

    println!("{}", "📋 Publications".bright_blue().bold());
    println!();

    let publications = service
        .list(&filter)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list publications: {}", e))?;

    if publications.is_empty() {
        println!("{}", "  No publications found".yellow());
        return Ok(());
    }

    println!(
        "  {:<8}  {:<4}  {:<40}  {}",
        "ID".bright_white().bold(),
        "Year".bright_white().bold(),
        "Title".bright_white().bold(),
        "Species / Missions".bright_white().bold()
    );
    println!("  {}", "─".repeat(76).bright_black());

    for p in &publications {
        let species: Vec<&str> = p.species.iter().map(|s| s.label()).collect();
        let missions: Vec<&str> = p.missions.iter().map(|m| m.label()).collect();

        println!(
            "  {:<8}  {:<4}  {:<40}  {} / {}",
            p.short_id().bright_black(),
            p.year,
            excerpt(&p.title, 38).cyan(),
            species.join(", "),
            missions.join(", ")
        );
    }

    println!();
    println!(
        "  Total: {}",
        publications.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Deletes one publication after confirmation (default: No).
async fn delete_publication(config: &Config, id: Uuid, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Publication".bright_blue().bold());
    println!();

    let service = service(config).await?;
    let publication = service
        .get(id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("  Title: {}", publication.title.cyan());
    println!("  ID:    {}", publication.id.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this publication?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete publication: {}", e))?;

    println!("{}", "✅ Publication deleted".green().bold());
    Ok(())
}

/// Imports a JSON array of publications.
///
/// Each element may be a full exported record in either schema, or a bare
/// draft without id and timestamps, also in either schema. Imported records
/// always receive fresh ids and timestamps.
async fn import(config: &Config, file: PathBuf, skip_confirm: bool) -> Result<()> {
    println!("{}", "📥 Import Publications".bright_blue().bold());
    println!();

    let raw = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let values: Vec<serde_json::Value> =
        serde_json::from_str(&raw).context("Import file must contain a JSON array")?;

    let mut drafts = Vec::with_capacity(values.len());
    let mut legacy_count = 0usize;

    for (index, value) in values.into_iter().enumerate() {
        let is_project = value.get("project_name").is_some();
        let draft = match legacy::normalize(value.clone()) {
            Ok(publication) => NewPublication::from(publication),
            Err(_) => legacy::normalize_draft(value)
                .with_context(|| format!("Record {index} matches no known schema"))?,
        };
        if is_project {
            legacy_count += 1;
        }
        drafts.push(draft);
    }

    println!("  File:     {}", file.display().to_string().cyan());
    println!("  Records:  {}", drafts.len().to_string().bright_white().bold());
    println!("  Legacy:   {}", legacy_count.to_string().bright_black());
    println!();

    if drafts.is_empty() {
        println!("{}", "  Nothing to import".yellow());
        return Ok(());
    }

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Import these publications?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let service = service(config).await?;
    let inserted = service
        .import(drafts)
        .await
        .map_err(|e| anyhow::anyhow!("Import failed: {}", e))?;

    println!(
        "{}",
        format!("✅ Imported {} publications", inserted.len())
            .green()
            .bold()
    );
    Ok(())
}
