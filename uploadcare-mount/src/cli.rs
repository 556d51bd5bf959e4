//! CLI glue for uploadcare-mount.
//!
//! Each subcommand mounts a single field (`--field`, default `file`) on an
//! in-memory document and drives it through the same lifecycle a host
//! persistence layer would:
//!
//! - `inspect`: read the field and print the resolved file as JSON
//! - `store`: save the document with the field changed to `--url`
//! - `delete`: destroy a document holding `--url`
//!
//! Queued jobs are drained before the command returns. All coordination logic
//! lives in `uploadcare-mount-core`; this module only wires collaborators.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use uploadcare_mount_core::cache::MemoryCache;
use uploadcare_mount_core::document::MemoryDocument;
use uploadcare_mount_core::hooks::HookRegistry;
use uploadcare_mount_core::id_extractor::UuidExtractor;
use uploadcare_mount_core::{mount_uploadcare_file, Collaborators, MountedFile};

use crate::api_client::UploadcareClient;
use crate::cache_file::load_cache_file;
use crate::job_queue::TokioJobQueue;
use crate::load_config::{credentials_from_env, load_config, CliConfig, Credentials};

/// CLI for uploadcare-mount: store, delete and inspect Uploadcare files referenced by documents.
#[derive(Parser)]
#[clap(
    name = "uploadcare-mount",
    version,
    about = "Store, delete and inspect Uploadcare files the way a mounted document attribute does"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the file referenced by a CDN URL, enriched from the cache file if given
    Inspect(FileArgs),
    /// Save a document whose mounted field changed to the given CDN URL
    Store(FileArgs),
    /// Destroy a document whose mounted field holds the given CDN URL
    Delete(FileArgs),
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Path to the YAML config file
    #[clap(long)]
    pub config: PathBuf,
    /// CDN URL held by the mounted field
    #[clap(long)]
    pub url: String,
    /// JSON file seeding the file attribute cache
    #[clap(long)]
    pub cache: Option<PathBuf>,
    /// Name of the mounted field
    #[clap(long, default_value = "file")]
    pub field: String,
}

/// Wired-up mount for one CLI invocation.
struct Session {
    registry: HookRegistry,
    mounted: Arc<MountedFile>,
    jobs: Arc<TokioJobQueue>,
}

impl Session {
    fn open(config: &CliConfig, credentials: &Credentials, args: &FileArgs) -> Result<Self> {
        let cache = match &args.cache {
            Some(path) => load_cache_file(path)?,
            None => MemoryCache::new(),
        };
        let api = Arc::new(
            UploadcareClient::new(&config.api, credentials)
                .map_err(|e| anyhow::anyhow!("Failed to construct API client: {e}"))?,
        );
        let jobs = Arc::new(TokioJobQueue::start(api.clone(), &config.jobs));

        let mut registry = HookRegistry::new();
        let mounted = mount_uploadcare_file(
            &mut registry,
            &args.field,
            &config.uploadcare,
            Collaborators {
                extractor: Arc::new(UuidExtractor::new()),
                cache: Arc::new(cache),
                api,
                jobs: jobs.clone(),
            },
        );
        Ok(Session {
            registry,
            mounted,
            jobs,
        })
    }

    async fn close(self) {
        self.jobs.shutdown().await;
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Inspect(args) => {
            let config = load_config(&args.config)?;
            // Inspect never reaches the API, so credentials are optional here.
            let credentials = credentials_from_env().unwrap_or_default();
            let session = Session::open(&config, &credentials, &args)?;

            let doc = MemoryDocument::with_fields([(args.field.as_str(), args.url.as_str())]);
            let file = session.mounted.read(&doc).await;
            session.close().await;

            match file {
                Some(file) => println!(
                    "{}",
                    serde_json::to_string_pretty(&file).context("Failed to render file as JSON")?
                ),
                None => println!("no file"),
            }
            Ok(())
        }
        Commands::Store(args) => {
            let config = load_config(&args.config)?;
            let credentials = credentials_from_env()?;
            let session = Session::open(&config, &credentials, &args)?;

            let doc = MemoryDocument::new();
            doc.set(&args.field, args.url.as_str());
            let changes = doc.take_changes();
            tracing::info!(command = "store", field = %args.field, "Running after-save hooks");
            let result = session.registry.after_save(&doc, &changes).await;
            session.close().await;

            match result {
                Ok(()) => {
                    tracing::info!(command = "store", "Store complete");
                    println!("store: done ({})", describe(&args.url));
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "store", error = %e, "Store failed");
                    Err(anyhow::Error::new(e).context("Store failed"))
                }
            }
        }
        Commands::Delete(args) => {
            let config = load_config(&args.config)?;
            let credentials = credentials_from_env()?;
            let session = Session::open(&config, &credentials, &args)?;

            let doc = MemoryDocument::with_fields([(args.field.as_str(), args.url.as_str())]);
            tracing::info!(command = "delete", field = %args.field, "Running destroy hooks");
            let result = match session.registry.before_destroy(&doc).await {
                Ok(()) => session.registry.after_destroy(&doc).await,
                Err(e) => Err(e),
            };
            session.close().await;

            match result {
                Ok(()) => {
                    tracing::info!(command = "delete", "Delete complete");
                    println!("delete: done ({})", describe(&args.url));
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "delete", error = %e, "Delete failed");
                    Err(anyhow::Error::new(e).context("Delete failed"))
                }
            }
        }
    }
}

fn describe(url: &str) -> &str {
    if url.is_empty() {
        "no file"
    } else {
        url
    }
}
