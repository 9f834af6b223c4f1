use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use handbook_server::{
    auth::{ensure_admin, purge_expired},
    config::Config,
    db::create_pool,
    handlers::settings::load_settings,
    routes::{create_router, AppState},
    sitegen::SiteGenerator,
    DbPool,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
Usage: handbook-server [COMMAND]

Commands:
  serve                 Run the HTTP server (default)
  generate [--out DIR]  Write the published handbook as static HTML

Options:
  -h, --help            Print this help";

enum Command {
    Serve,
    Generate { out: Option<PathBuf> },
    Help,
}

fn parse_args() -> anyhow::Result<Command> {
    let mut args = std::env::args().skip(1);

    let command = match args.next().as_deref() {
        None | Some("serve") => Command::Serve,
        Some("-h") | Some("--help") => Command::Help,
        Some("generate") => {
            let mut out = None;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--out" | "-o" => {
                        let dir = args.next().context("--out requires a directory")?;
                        out = Some(PathBuf::from(dir));
                    }
                    other => anyhow::bail!("unexpected argument '{}'\n\n{}", other, USAGE),
                }
            }
            Command::Generate { out }
        }
        Some(other) => anyhow::bail!("unknown command '{}'\n\n{}", other, USAGE),
    };

    Ok(command)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = parse_args()?;
    if let Command::Help = command {
        println!("{}", USAGE);
        return Ok(());
    }

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handbook_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = create_pool(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    ensure_admin(&db, &config).await?;
    let purged = purge_expired(&db).await?;
    if purged > 0 {
        tracing::info!("Removed {} expired sessions", purged);
    }

    match command {
        Command::Generate { out } => generate(db, config, out).await,
        _ => serve(db, config).await,
    }
}

async fn serve(db: DbPool, config: Config) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        "Pages backend: {:?}; uploads in {}",
        config.pages_backend,
        config.uploads_dir.display()
    );

    let app = create_router(AppState::new(db, config));

    tracing::info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn generate(
    db: DbPool,
    config: Config,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let out_dir = out.unwrap_or_else(|| config.static_pages_dir.clone());
    let generator = SiteGenerator::new(
        config.templates_dir.as_deref(),
        config.static_assets_prefix.clone(),
    )?;

    let settings = load_settings(&db).await?;
    let state = AppState::new(db, config);
    let tree = state.handbook.read().await?;

    let report = generator.generate(&tree, &settings, &out_dir).await?;
    tracing::info!(
        "Generated index and {} page(s) in {}",
        report.pages.len(),
        report.out_dir.display()
    );

    Ok(())
}
