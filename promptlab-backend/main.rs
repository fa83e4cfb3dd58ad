mod api;
mod collections;
mod config;
mod error;
mod models;
mod prompts;
mod records;
mod tags;
mod utils;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::body::Body;
use clap::Parser;
use dotenvy::dotenv;
use hyper::Request;
use sentry::integrations::tower::{NewSentryLayer, SentryHttpLayer};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::collections::file_repository::FileCollectionRepository;
use crate::collections::repository::CollectionRepository;
use crate::config::{Config, LogFormat};
use crate::prompts::file_repository::FilePromptRepository;
use crate::prompts::repository::PromptRepository;

#[derive(Parser)]
#[command(name = "promptlab", version, about = "Prompt and collection store with tagging")]
enum Cli {
    /// Start the HTTP server (default when no subcommand is given)
    #[command(alias = "run")]
    Serve {
        /// Port to listen on, overrides PORT
        #[arg(long)]
        port: Option<u16>,
        /// Storage directory, overrides PROMPTLAB_DATA_DIR
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print every tag in use, one per line
    Tags {
        /// Storage directory, overrides PROMPTLAB_DATA_DIR
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    // No arguments means serve; --help and --version still go through clap.
    let args: Vec<String> = std::env::args().collect();
    let cli = if args.len() <= 1 {
        Cli::Serve {
            port: None,
            data_dir: None,
        }
    } else {
        Cli::parse()
    };

    let mut config = Config::from_env();
    match cli {
        Cli::Serve { port, data_dir } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            run_server(config).await
        }
        Cli::Tags { data_dir } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            print_tags(&config).await
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "promptlab={},tower_http=warn,hyper=warn",
            config.log_level
        ))
    });

    let (tree, json) = match config.log_format {
        LogFormat::Tree => (
            Some(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(false),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tree)
        .with(json)
        .with(sentry::integrations::tracing::layer().event_filter(
            |md| match *md.level() {
                tracing::Level::ERROR => sentry::integrations::tracing::EventFilter::Event,
                tracing::Level::WARN | tracing::Level::INFO => {
                    sentry::integrations::tracing::EventFilter::Breadcrumb
                }
                _ => sentry::integrations::tracing::EventFilter::Ignore,
            },
        ))
        .init();
}

async fn open_repositories(
    config: &Config,
) -> anyhow::Result<(Arc<FilePromptRepository>, Arc<FileCollectionRepository>)> {
    let prompt_repo = Arc::new(FilePromptRepository::new(&config.data_dir));
    prompt_repo
        .load_all()
        .await
        .context("failed to load prompts")?;

    let collection_repo = Arc::new(FileCollectionRepository::new(&config.data_dir));
    collection_repo
        .load_all()
        .await
        .context("failed to load collections")?;

    Ok((prompt_repo, collection_repo))
}

async fn run_server(config: Config) -> Result<(), Box<dyn Error>> {
    init_tracing(&config);

    let _guard = sentry::init((
        config.sentry_dsn.clone().unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.as_str().into()),
            send_default_pii: false,
            traces_sample_rate: 0.2,
            enable_logs: true,
            ..Default::default()
        },
    ));

    let (prompt_repo, collection_repo) = open_repositories(&config).await?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        environment = %config.environment,
        prompts = prompt_repo.list().await.len(),
        collections = collection_repo.list().await.len(),
        "loaded storage"
    );

    let state = api::AppState {
        prompt_repo,
        collection_repo,
    };
    let app = api::create_app(state, &config.cors_origins)
        .layer(SentryHttpLayer::new().enable_transaction())
        .layer(NewSentryLayer::<Request<Body>>::new_from_top());

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    println!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn print_tags(config: &Config) -> Result<(), Box<dyn Error>> {
    let (prompt_repo, _) = open_repositories(config).await?;
    for tag in tags::list_tags(prompt_repo.as_ref()).await {
        println!("{tag}");
    }
    Ok(())
}
