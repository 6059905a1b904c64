mod cli;
mod config;
mod error;
mod history;
mod models;
mod promo;
mod report;
mod search;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, HistoryAction, SearchArgs};
use crate::config::AppConfig;
use crate::history::{HistoryStore, JsonFileHistory};
use crate::models::{ImageFile, PropertyDetails, SearchResponse};
use crate::promo::{PollPolicy, PromoVideoMediator, VeoClient};
use crate::search::{GeminiSearchClient, OEmbedProbe, SearchImages, VideoSearchMediator};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let client = Client::builder()
        .timeout(config.request_timeout)
        .user_agent(concat!("tour-scout/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    match cli.command {
        Command::Search(args) => run_search(&config, client, args).await,
        Command::Promo => run_promo(&config, client).await,
        Command::History { user, action } => {
            let store = JsonFileHistory::new(&config.history_dir);
            run_history(&store, &user, action).await
        }
    }
}

async fn run_search(config: &AppConfig, client: Client, args: SearchArgs) -> Result<()> {
    let details = PropertyDetails {
        street: args.street,
        city: args.city,
        state: args.state,
        zip: args.zip,
        mls_number: args.mls_number,
    };
    let images = SearchImages {
        front: load_image(args.front.as_deref()).await?,
        back: load_image(args.back.as_deref()).await?,
    };

    let mediator = VideoSearchMediator::new(
        config.keys.clone(),
        Box::new(GeminiSearchClient::new(
            client.clone(),
            &config.api_base,
            &config.search_model,
        )),
        Box::new(OEmbedProbe::new(client)),
        config.probe_timeout,
    );

    let response = mediator.search(&details, &images).await?;
    print_response(&response);

    if let Some(path) = &args.export {
        export(path, &details, &response).await?;
    }

    if let Some(owner) = &args.save_as {
        let store = JsonFileHistory::new(&config.history_dir);
        match store.save(owner, args.title.as_deref(), &details, &response).await {
            Ok(saved) => println!("Saved as {} ({})", saved.title, saved.id),
            Err(err) => error!(error = %err, "could not save search"),
        }
    }

    Ok(())
}

async fn load_image(path: Option<&Path>) -> Result<Option<ImageFile>> {
    match path {
        Some(path) => Ok(Some(ImageFile::load(path).await?)),
        None => Ok(None),
    }
}

async fn run_promo(config: &AppConfig, client: Client) -> Result<()> {
    let mediator = PromoVideoMediator::new(
        config.keys.clone(),
        Box::new(VeoClient::new(client, &config.api_base, &config.video_model)),
        PollPolicy {
            interval: config.poll_interval,
            max_duration: config.poll_max,
        },
    );

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling video generation");
            on_ctrl_c.cancel();
        }
    });

    info!("generating promotional video, this can take a few minutes");
    let url = mediator.generate(&cancel).await?;
    println!("{url}");
    Ok(())
}

async fn run_history(store: &dyn HistoryStore, user: &str, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            let searches = store.list(user).await?;
            if searches.is_empty() {
                println!("No saved searches.");
            }
            for search in searches {
                let shared = if search.is_owned_by(user) { "" } else { " [shared]" };
                println!(
                    "{}  {}  {}{} ({} links)",
                    search.id,
                    search.created_at.format("%Y-%m-%d %H:%M"),
                    search.title,
                    shared,
                    search.response.videos.len()
                );
            }
        }
        HistoryAction::Show { id } => {
            let search = store.get(id, user).await?;
            println!("{} - {}", search.title, search.details.display_address());
            if !search.shared_with.is_empty() {
                println!("Shared with: {}", search.shared_with.join(", "));
            }
            print_response(&search.response);
        }
        HistoryAction::Rename { id, title } => {
            let search = store.rename(id, user, &title).await?;
            println!("Renamed to {}", search.title);
        }
        HistoryAction::Share { id, viewers } => {
            let search = store.share(id, user, &viewers).await?;
            if search.shared_with.is_empty() {
                println!("No longer shared.");
            } else {
                println!("Shared with: {}", search.shared_with.join(", "));
            }
        }
        HistoryAction::Delete { id } => {
            store.delete(id, user).await?;
            println!("Deleted {id}");
        }
        HistoryAction::Export { id, path } => {
            let search = store.get(id, user).await?;
            export(&path, &search.details, &search.response).await?;
        }
    }
    Ok(())
}

async fn export(path: &Path, details: &PropertyDetails, response: &SearchResponse) -> Result<()> {
    let doc = report::render(details, response, Utc::now());
    tokio::fs::write(path, doc)
        .await
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!(path = %path.display(), "report exported");
    Ok(())
}

fn print_response(response: &SearchResponse) {
    println!("{}", response.summary.trim());
    println!();
    if !response.found {
        println!("No videos found.");
        return;
    }
    for (i, video) in response.videos.iter().enumerate() {
        println!("{}. {}", i + 1, video.title);
        println!("   URL: {}", video.url);
        println!("   Source: {}", video.source);
    }
}
