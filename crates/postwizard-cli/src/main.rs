mod config;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use postwizard_auth::{SecretHandler, StoreOutcome};
use postwizard_db::{ContentDb, Vault};
use postwizard_types::wordpress::Taxonomy;
use postwizard_types::{ProviderSecret, SecretType};
use postwizard_workflows::classifier::FieldClassifiers;
use postwizard_workflows::dump::import_dump;
use postwizard_workflows::filtering::{filter_published, record_title};
use postwizard_workflows::payload::{VideoPost, video_post_payload};
use postwizard_workflows::publish_checker::{RetrySchedule, wait_for_publication};
use postwizard_workflows::slug::{SlugLayout, SlugOptions, make_slug_with};
use postwizard_workflows::taxonomy::{get_model_ids, get_tag_ids};
use postwizard_workflows::{JsonExportSource, WpPostCache};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "postwizard")]
#[command(about = "Content publishing pipeline for WordPress affiliate sites")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Secrets vault management
    #[command(subcommand)]
    Vault(VaultCommand),

    /// Store, read and remove provider credentials
    #[command(subcommand)]
    Secrets(SecretsCommand),

    /// Build a post slug
    Slug {
        #[arg(long)]
        partner: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        studio: Option<String>,
        /// Trailing content-type word, e.g. `video`
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, value_enum, default_value_t = Layout::Default)]
        layout: Layout,
    },

    /// Partner text dumps
    #[command(subcommand)]
    Dump(DumpCommand),

    /// Partner content databases
    #[command(subcommand)]
    Content(ContentCommand),

    /// Local WordPress post cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Suggest categories for a post
    Classify {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
        #[arg(long, default_value_t = 3)]
        top: usize,
        /// Print every label any title model picks instead of ranking
        #[arg(long)]
        labels: bool,
    },

    /// Print the WordPress post JSON for a partner video
    Payload {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        partner: String,
        #[arg(long)]
        tracking_url: String,
        #[arg(long)]
        banner_url: String,
        /// Comma-separated tags, matched against the cached site terms
        #[arg(long, default_value = "")]
        tags: String,
        /// Comma-separated model names
        #[arg(long, default_value = "")]
        models: String,
    },
}

#[derive(Subcommand)]
enum VaultCommand {
    /// Create the key and vault if they don't exist yet
    Init,
}

#[derive(Subcommand)]
enum SecretsCommand {
    /// Store a credential given as JSON, e.g. `{"provider":"brave","api_key":"..."}`
    Store {
        /// JSON credential, or `-` to read it from stdin
        json: String,
        /// Update the rows when they already exist
        #[arg(long, conflicts_with = "replace")]
        upsert: bool,
        /// Delete existing rows of the same types first
        #[arg(long)]
        replace: bool,
    },
    /// Print the credentials stored under a secret type
    Get { secret_type: SecretType },
    /// Re-encrypt one secret in place
    Update {
        secret_type: SecretType,
        name: String,
        secret: String,
    },
    /// Remove credentials of a type, optionally only the one named
    Delete {
        secret_type: SecretType,
        #[arg(long)]
        name: Option<String>,
    },
    /// List vault rows without decrypting them
    List,
}

#[derive(Subcommand)]
enum DumpCommand {
    /// Convert a pipe-delimited text dump into a SQLite content database
    Import { txt: PathBuf, db: PathBuf },
}

#[derive(Subcommand)]
enum ContentCommand {
    /// Titles in a content database that are not on the site yet
    Pending {
        db: PathBuf,
        #[arg(long, default_value_t = 0)]
        table: usize,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Refresh the cache from a posts export
    Sync { export: PathBuf },
    /// Check whether a title is already published
    Published { title: String },
    /// Re-sync until a slug is live and print its link
    Wait {
        slug: String,
        export: PathBuf,
        #[arg(long)]
        max_attempts: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    Default,
    Reverse,
    PartnerOut,
}

impl From<Layout> for SlugLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Default => SlugLayout::Default,
            Layout::Reverse => SlugLayout::Reverse,
            Layout::PartnerOut => SlugLayout::PartnerOut,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postwizard=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Vault(VaultCommand::Init) => {
            Vault::initialize(&config.vault)?;
            println!("{}", config.vault.db_path().display());
        }
        Commands::Secrets(cmd) => secrets(&config, cmd)?,
        Commands::Slug {
            partner,
            title,
            model,
            studio,
            content,
            layout,
        } => {
            let options = SlugOptions {
                studio: studio.as_deref(),
                layout: layout.into(),
            };
            println!("{}", make_slug_with(&partner, model.as_deref(), &title, &content, options));
        }
        Commands::Dump(DumpCommand::Import { txt, db }) => {
            let report = import_dump(&txt, &db)?;
            println!("{} rows imported, {} skipped", report.rows.len(), report.skipped);
        }
        Commands::Content(ContentCommand::Pending { db, table }) => {
            let content = ContentDb::open(&db, table)?;
            let cache = WpPostCache::load(&config.wp_cache)?;
            let pending = filter_published(content.records()?, content.columns(), &cache, config.title_source);
            for record in &pending {
                if let Some(title) = record_title(record, content.columns()) {
                    println!("{}", title);
                }
            }
            info!("{} records pending in {}", pending.len(), db.display());
        }
        Commands::Cache(cmd) => cache(&config, cmd).await?,
        Commands::Classify {
            title,
            description,
            tags,
            top,
            labels,
        } => {
            let classifiers = FieldClassifiers::load_dir(&config.models_dir)?;
            if classifiers.is_empty() {
                anyhow::bail!("no classifier models in {}", config.models_dir.display());
            }
            let categories: Vec<String> = if labels {
                classifiers.classify_title(&title).into_iter().collect()
            } else {
                classifiers.suggest(&title, &description, &tags, top)
            };
            for category in categories {
                println!("{}", category);
            }
        }
        Commands::Payload {
            slug,
            title,
            description,
            partner,
            tracking_url,
            banner_url,
            tags,
            models,
        } => {
            let cache = WpPostCache::load(&config.wp_cache)?;
            let video = VideoPost {
                slug: &slug,
                title: &title,
                description: &description,
                partner: &partner,
                tracking_url: &tracking_url,
                banner_url: &banner_url,
                tag_ids: get_tag_ids(&cache, &split_list(&tags), Taxonomy::Tags),
                model_ids: get_model_ids(&cache, &split_list(&models)),
                category_ids: None,
            };
            let payload = video_post_payload(&video, &config.site);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty()).collect()
}

fn secrets(config: &AppConfig, cmd: SecretsCommand) -> anyhow::Result<()> {
    let vault = Arc::new(Vault::initialize(&config.vault)?);
    let handler = SecretHandler::new(vault.clone());

    match cmd {
        SecretsCommand::Store { json, upsert, replace } => {
            let raw = if json == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                json
            };
            let secret: ProviderSecret = serde_json::from_str(&raw).context("parsing credential JSON")?;
            if upsert {
                match handler.store_or_update(&secret)? {
                    StoreOutcome::Stored => println!("stored"),
                    StoreOutcome::Updated => println!("updated"),
                }
            } else if replace {
                println!("{} rows written", handler.replace(&secret)?);
            } else {
                println!("{} rows written", handler.store(&secret)?);
            }
        }
        SecretsCommand::Get { secret_type } => {
            let found = handler.get(secret_type)?;
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        SecretsCommand::Update {
            secret_type,
            name,
            secret,
        } => {
            handler.update(secret_type, &name, &secret)?;
        }
        SecretsCommand::Delete { secret_type, name } => {
            let removed = handler.delete(secret_type, name.as_deref())?;
            println!("{} rows removed", removed);
        }
        SecretsCommand::List => {
            for row in vault.list_entries()? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.id,
                    row.secret_type,
                    row.name,
                    row.metadata_str(),
                    row.updated_at.as_deref().unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

async fn cache(config: &AppConfig, cmd: CacheCommand) -> anyhow::Result<()> {
    match cmd {
        CacheCommand::Sync { export } => {
            let mut cache = match WpPostCache::load(&config.wp_cache) {
                Ok(cache) => cache,
                Err(postwizard_workflows::CacheError::NotFound(path)) => WpPostCache::from_posts(path, Vec::new()),
                Err(e) => return Err(e.into()),
            };
            let report = cache.hot_sync(&mut JsonExportSource::new(export))?;
            println!("{}", report);
        }
        CacheCommand::Published { title } => {
            let cache = WpPostCache::load(&config.wp_cache)?;
            let published = cache.is_published(&title, config.title_source);
            println!("{}", published);
        }
        CacheCommand::Wait {
            slug,
            export,
            max_attempts,
        } => {
            let mut cache = WpPostCache::load(&config.wp_cache)?;
            let mut source = JsonExportSource::new(export);
            let schedule = RetrySchedule {
                max_attempts,
                ..Default::default()
            };
            match wait_for_publication(&mut cache, &mut source, &slug, schedule).await? {
                Some(link) => println!("{}", link),
                None => anyhow::bail!("{} was not published", slug),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_arguments_drop_blanks() {
        assert_eq!(split_list(" Big City, ,outdoor,"), vec!["Big City", "outdoor"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn payload_command_parses() {
        let cli = Cli::try_parse_from([
            "postwizard",
            "payload",
            "--slug",
            "partner-clip",
            "--title",
            "Clip",
            "--partner",
            "Partner",
            "--tracking-url",
            "https://track.example.com/t/1",
            "--banner-url",
            "https://cdn.example.com/b.jpg",
            "--tags",
            "beach,sunset",
        ])
        .unwrap();
        match cli.command {
            Commands::Payload { slug, tags, models, .. } => {
                assert_eq!(slug, "partner-clip");
                assert_eq!(split_list(&tags), vec!["beach", "sunset"]);
                assert!(models.is_empty());
            }
            _ => panic!("expected payload"),
        }
    }
}
