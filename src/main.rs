use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use event_gallery::access::{open_gate, require_access, run_interactive_challenge};
use event_gallery::api::ApiClient;
use event_gallery::cli::{Cli, Commands};
use event_gallery::config::Config;
use event_gallery::gallery::{GalleryStore, RemoveOutcome};
use event_gallery::upload::{LocalFile, UploadSession};
use event_gallery::viewer;
use indicatif::ProgressBar;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(verbose: bool) {
    let default = if verbose { "event_gallery=debug" } else { "event_gallery=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;
    let client = ApiClient::from_config(&config);

    match cli.command {
        Commands::Upload { files, name } => {
            println!("📤 Share your photos and videos\n");
            println!("📁 Maximum file sizes: 📸 Images 10MB / 🎥 Videos 100MB\n");

            let mut selected = Vec::with_capacity(files.len());
            for path in &files {
                selected.push(LocalFile::from_path(path)?);
            }

            let mut session = UploadSession::from_config(client, &config);
            session.set_display_name(name);
            if session.select(selected).is_err() {
                println!("{}", session.status());
                return Ok(ExitCode::FAILURE);
            }
            for file in session.files() {
                println!(
                    "  - {} ({})",
                    file.candidate.file_name,
                    event_gallery::common::media::format_size(file.candidate.size)
                );
            }
            println!("{}", session.status());

            let spinner = ProgressBar::new_spinner();
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner.set_message("⏳ Uploading... Please wait.");
            let outcome = session.submit().await;
            spinner.finish_and_clear();

            println!("{}", session.status());
            if outcome.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Access => {
            let mut gate = open_gate(&config)?;
            if gate.is_authorized() {
                println!("✔ Gallery is already unlocked");
            } else if !run_interactive_challenge(&mut gate)? {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Gallery => {
            let mut gate = open_gate(&config)?;
            require_access(&mut gate)?;

            let mut store = GalleryStore::new(client);
            let assets = store.fetch_all().await;
            viewer::print_listing(assets);
        }

        Commands::Delete { id, yes } => {
            let mut gate = open_gate(&config)?;
            require_access(&mut gate)?;

            let mut store = GalleryStore::new(client);
            store.fetch_all().await;
            let confirm = |prompt: &str| {
                yes || Confirm::new()
                    .with_prompt(prompt)
                    .default(false)
                    .interact()
                    .unwrap_or(false)
            };
            match store.remove(&id, confirm).await {
                Ok(RemoveOutcome::Removed) => println!("✔ Deleted {}", id),
                Ok(RemoveOutcome::Declined) => println!("Cancelled"),
                Err(e) => {
                    println!("❌ {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Download { id, output } => {
            let mut gate = open_gate(&config)?;
            require_access(&mut gate)?;

            let mut store = GalleryStore::new(client);
            store.fetch_all().await;
            let path = store.download(&id, &output).await?;
            println!("✔ Saved: {}", path.display());
        }

        Commands::Slideshow { start, play } => {
            let mut gate = open_gate(&config)?;
            require_access(&mut gate)?;

            let mut store = GalleryStore::new(client);
            let assets = store.fetch_all().await.to_vec();
            let start = start.saturating_sub(1);
            viewer::run_slideshow(&assets, start, play, config.autoplay_interval())
                .await
                .context("slideshow")?;
        }

        Commands::Lock => {
            let mut gate = open_gate(&config)?;
            gate.revoke()?;
            println!("🔒 Gallery locked");
        }

        Commands::Config { set_api_url, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_base_url(url)?;
                println!("✔ APIのURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  API: {}", config.api_base_url());
                println!("  アップロードのタイムアウト: {}秒", config.upload_timeout_seconds);
                println!("  ステータス表示のリセット: {}秒", config.status_reset_seconds);
                println!("  自動再生の間隔: {}ms", config.autoplay_interval_ms);
                println!("  セッション: {}", config.session_path()?.display());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
