//! Folio Command-Line Interface
//!
//! Applies the site's schema migrations to a local store and inspects the
//! result.

mod commands;
mod formatter;

use clap::{Parser, Subcommand};
use folio_core::catalog::Site;
use folio_core::schema::SiteRegistry;
use folio_core::{SchemaStore, StoreConfig};
use formatter::OutputFormat;
use std::path::PathBuf;

/// Folio schema migrations
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about = "Folio schema migrations")]
pub struct Args {
    /// Schema store directory
    #[arg(long, default_value = "./folio-data", global = true)]
    pub data: PathBuf,

    /// Handle of the primary site, created if the store has none
    #[arg(long, default_value = "default", global = true)]
    pub site: String,

    /// Language of the primary site
    #[arg(long, default_value = "en-US", global = true)]
    pub site_language: String,

    /// Output format
    #[arg(long, default_value = "table", value_enum, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply every pending migration step
    Migrate {
        /// Continue with later steps after a step fails
        #[arg(long)]
        keep_going: bool,
    },
    /// Show the recorded status of every step
    Status,
    /// Try to revert a step (steps are one-way)
    Revert {
        /// Step identifier
        step_id: String,
    },
    /// Show sections and entry type layouts
    Schema {
        /// Show an earlier schema version
        #[arg(long)]
        at: Option<u64>,
    },
    /// Create a category unless the group already has one with that title
    SeedCategory {
        /// Category group handle
        #[arg(long)]
        group: String,
        /// Category title
        #[arg(long)]
        title: String,
        /// Title of the parent category
        #[arg(long)]
        parent: Option<String>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("folio=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the command. `Ok(false)` means the command ran but did not succeed.
fn run(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let store = SchemaStore::open(&StoreConfig::new(args.data.clone()))?;
    let site = Site::new(&args.site, &args.site, &args.site_language).primary();
    if SiteRegistry::new(&store).primary().is_err() && SiteRegistry::new(&store).ensure_site(site)? {
        tracing::info!(site = %args.site, "initialised primary site");
    }

    let formatter = formatter::create_formatter(args.format);
    let steps = folio_site::steps();

    let ok = match args.command {
        Command::Migrate { keep_going } => commands::migrate(&store, &steps, keep_going, formatter.as_ref())?,
        Command::Status => commands::status(&store, &steps, formatter.as_ref())?,
        Command::Revert { step_id } => commands::revert(&store, &steps, &step_id, formatter.as_ref())?,
        Command::Schema { at } => commands::schema(&store, at, formatter.as_ref())?,
        Command::SeedCategory { group, title, parent } => {
            commands::seed_category(&store, &group, &title, parent.as_deref(), formatter.as_ref())?
        }
    };
    store.flush()?;
    Ok(ok)
}
