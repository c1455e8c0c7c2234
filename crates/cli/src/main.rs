//! Shodhsutra CLI - scripted access to the CMS backend.
//!
//! # Usage
//!
//! ```bash
//! # List consultation requests matching "sharma", second page
//! ss-cli consultations list --search sharma --page 2
//!
//! # Delete one (asks for confirmation unless --yes)
//! ss-cli consultations delete 65a1f0c2e4
//!
//! # Upload or replace a gallery image
//! ss-cli gallery upload ./poster.jpg
//! ss-cli gallery replace 65a1f0c2e4 ./poster-v2.jpg
//!
//! # Preview a draft body and publish a blog post
//! ss-cli render body.json
//! ss-cli publish blog post.json
//! ```
//!
//! # Environment Variables
//!
//! - `SHODHSUTRA_EMAIL` / `SHODHSUTRA_PASSWORD` - Credentials traded for a token
//! - `BACKEND_API_URL`, `BACKEND_ASSET_URL`, `BACKEND_TIMEOUT_SECS` - As for the web console

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use shodhsutra_core::DraftKind;

mod commands;

#[derive(Parser)]
#[command(name = "ss-cli")]
#[command(author, version, about = "Shodhsutra CMS console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consultation requests
    Consultations {
        #[command(subcommand)]
        action: ConsultationAction,
    },
    /// Appointment requests (read-only)
    Appointments {
        #[command(subcommand)]
        action: AppointmentAction,
    },
    /// Gallery images
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },
    /// Student results (read-only here; edit in the web console)
    Results {
        #[command(subcommand)]
        action: ResultAction,
    },
    /// Print the slug a title produces
    Slug {
        /// Post or case-study title
        title: String,
    },
    /// Apply editor commands from a JSON file and print the HTML
    Render {
        /// JSON array of editor commands
        file: PathBuf,
    },
    /// Create a blog post or case study from a JSON draft file
    Publish {
        /// What to create
        kind: PublishKind,
        /// JSON draft file
        file: PathBuf,
    },
}

/// Search and paging flags shared by every list command.
#[derive(Args)]
struct ListArgs {
    /// Case-insensitive search across the list's searchable fields
    #[arg(short, long, default_value = "")]
    search: String,

    /// 1-based page number (6 rows per page)
    #[arg(short, long, default_value_t = 1)]
    page: usize,
}

#[derive(Subcommand)]
enum ConsultationAction {
    /// List consultation requests
    List(ListArgs),
    /// Delete a consultation request
    Delete {
        /// Consultation id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AppointmentAction {
    /// List appointment requests
    List(ListArgs),
}

#[derive(Subcommand)]
enum GalleryAction {
    /// List gallery images with their public URLs
    List,
    /// Upload a new image
    Upload {
        /// Image file
        file: PathBuf,
    },
    /// Replace the file behind an existing image
    Replace {
        /// Gallery image id
        id: String,
        /// New image file
        file: PathBuf,
    },
    /// Delete an image
    Delete {
        /// Gallery image id
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ResultAction {
    /// List student results
    List(ListArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum PublishKind {
    Blog,
    CaseStudy,
}

impl From<PublishKind> for DraftKind {
    fn from(kind: PublishKind) -> Self {
        match kind {
            PublishKind::Blog => Self::Blog,
            PublishKind::CaseStudy => Self::CaseStudy,
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Consultations { action } => match action {
            ConsultationAction::List(args) => commands::consultations::list(&args.search, args.page).await?,
            ConsultationAction::Delete { id, yes } => commands::consultations::delete(&id, yes).await?,
        },
        Commands::Appointments { action } => match action {
            AppointmentAction::List(args) => commands::appointments::list(&args.search, args.page).await?,
        },
        Commands::Gallery { action } => match action {
            GalleryAction::List => commands::gallery::list().await?,
            GalleryAction::Upload { file } => commands::gallery::upload(None, &file).await?,
            GalleryAction::Replace { id, file } => commands::gallery::upload(Some(id), &file).await?,
            GalleryAction::Delete { id, yes } => commands::gallery::delete(&id, yes).await?,
        },
        Commands::Results { action } => match action {
            ResultAction::List(args) => commands::results::list(&args.search, args.page).await?,
        },
        Commands::Slug { title } => commands::drafts::slug(&title),
        Commands::Render { file } => commands::drafts::render(&file)?,
        Commands::Publish { kind, file } => commands::drafts::publish(kind.into(), &file).await?,
    }
    Ok(())
}
