use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillshare_server::background_jobs::{create_scheduler, jobs::StoryExpiryJob, JobContext};
use skillshare_server::config::{AppConfig, CliConfig, FileConfig};
use skillshare_server::media::MediaStorage;
use skillshare_server::user::auth::{generate_secret, TokenIssuer};
use skillshare_server::{run_server, RequestsLoggingLevel, ServerConfig, ServerState, SqlitePlatformStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values found there override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the SQLite database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Directory uploaded media are written to. Defaults to `<db-dir>/uploads`.
    #[clap(long, value_parser = parse_path)]
    pub upload_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Secret signing session tokens, at least 16 characters.
    /// When missing a random one is generated and sessions end on restart.
    #[clap(long)]
    pub jwt_secret: Option<String>,

    #[clap(long)]
    pub max_image_bytes: Option<u64>,

    #[clap(long)]
    pub max_video_bytes: Option<u64>,

    /// Seconds between two sweeps of expired stories.
    #[clap(long)]
    pub story_sweep_interval_secs: Option<u64>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            upload_dir: self.upload_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            jwt_secret: self.jwt_secret.clone(),
            max_image_bytes: self.max_image_bytes,
            max_video_bytes: self.max_video_bytes,
            story_sweep_interval_secs: self.story_sweep_interval_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening SQLite database at {:?}...", config.db_path());
    let store = Arc::new(SqlitePlatformStore::new(config.db_path())?);

    let media = Arc::new(MediaStorage::new(config.media_storage_config()));
    media
        .init()
        .await
        .with_context(|| format!("Failed to create upload dir {:?}", config.upload_dir))?;
    info!("Storing uploads in {:?}", config.upload_dir);

    let jwt_secret = match &config.jwt_secret {
        Some(secret) => secret.clone(),
        None => {
            warn!("No jwt_secret configured, generated a random one. Sessions will not survive a restart.");
            generate_secret()
        }
    };

    let state = ServerState::new(
        ServerConfig::from_app_config(&config),
        store,
        media,
        TokenIssuer::new(jwt_secret.as_bytes()),
    );

    let shutdown_token = CancellationToken::new();

    let job_context = JobContext::new(shutdown_token.child_token(), state.stories.clone());
    let (mut scheduler, scheduler_handle) = create_scheduler(shutdown_token.clone(), job_context);
    scheduler
        .register_job(Arc::new(StoryExpiryJob::new(Duration::from_secs(
            config.background_jobs.story_sweep_interval_secs,
        ))))
        .await;
    let scheduler_task = tokio::spawn(async move { scheduler.run().await });

    // Stories that expired while the server was down are swept right away.
    if let Err(e) = scheduler_handle.trigger_job(StoryExpiryJob::ID).await {
        warn!("Could not run the startup story sweep: {}", e);
    }

    info!("Ready to serve at port {}!", config.port);
    let mut server_task = tokio::spawn(run_server(state, shutdown_token.clone()));

    let server_result = tokio::select! {
        result = &mut server_task => Some(result),
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down...");
            None
        }
    };
    shutdown_token.cancel();

    let server_result = match server_result {
        Some(result) => result,
        None => server_task.await,
    };
    if let Err(e) = scheduler_task.await {
        error!("Scheduler task failed: {}", e);
    }
    server_result??;

    info!("Bye");
    Ok(())
}
