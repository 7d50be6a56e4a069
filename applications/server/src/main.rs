/// Otakuy Music server - album moderation and catalog service
use clap::{Parser, Subcommand};
use otakuy_core::AlbumLifecycle;
use otakuy_server::{
    config::ServerConfig,
    create_router,
    services::{AuthService, CoverStorage, DoubanClient, StoreIdentity},
    state::AppState,
};
use otakuy_storage::{users, SqliteAlbumStore};
use sqlx::SqlitePool;
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "otakuy-server")]
#[command(about = "Otakuy Music album moderation server", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./config.toml when present)
    #[arg(short, long, global = true, env = "OTAKUY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        /// Entitlement level compared against download permissions
        #[arg(long, default_value_t = 0)]
        star: u32,
        /// Grant the moderator capability
        #[arg(long)]
        moderator: bool,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "otakuy_server=info,otakuy_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::AddUser {
            username,
            password,
            star,
            moderator,
        } => add_user(&config, &username, &password, star, moderator).await?,
        Commands::ListUsers => list_users(&config).await?,
    }

    Ok(())
}

async fn open_database(config: &ServerConfig) -> anyhow::Result<SqlitePool> {
    let pool = otakuy_storage::create_pool(&config.storage.database_url).await?;
    otakuy_storage::run_migrations(&pool).await?;
    Ok(pool)
}

fn auth_service(config: &ServerConfig) -> otakuy_server::error::Result<AuthService> {
    AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
        config.auth.jwt_refresh_expiration_days,
    )
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Otakuy Music server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let pool = open_database(&config).await?;
    tracing::info!("Database connected");

    let covers = CoverStorage::new(
        config.covers.storage_path.clone(),
        config.covers.public_base_url.clone(),
    );
    covers.initialize().await?;
    tracing::info!(path = %covers.base_path().display(), "Cover storage initialized");

    let metadata = DoubanClient::new(
        &config.metadata.base_url,
        Duration::from_secs(config.metadata.timeout_secs),
    )?;

    let auth_service = Arc::new(auth_service(&config)?);
    let identity = StoreIdentity::new(pool.clone(), Arc::clone(&auth_service));

    let lifecycle = AlbumLifecycle::new(
        Arc::new(SqliteAlbumStore::new(pool.clone())),
        Arc::new(identity),
        Arc::new(covers),
        Arc::new(metadata),
    );

    let app_state = AppState::new(pool, Arc::new(lifecycle), Arc::clone(&auth_service));
    let app = create_router(app_state, auth_service, &config.covers.storage_path);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn add_user(
    config: &ServerConfig,
    username: &str,
    password: &str,
    star: u32,
    moderator: bool,
) -> anyhow::Result<()> {
    let pool = open_database(config).await?;

    let password_hash = auth_service(config)?.hash_password(password)?;
    let user = users::create(&pool, username, &password_hash, star, moderator).await?;

    tracing::info!(user_id = %user.id, username, star, moderator, "User created");
    println!("Created user {} ({})", user.username, user.id);

    Ok(())
}

async fn list_users(config: &ServerConfig) -> anyhow::Result<()> {
    let pool = open_database(config).await?;
    let users = users::get_all(&pool).await?;

    println!("Users:");
    for user in users {
        let role = if user.is_moderator { "moderator" } else { "user" };
        println!("  {} - {} (star {}, {})", user.id, user.username, user.star, role);
    }

    Ok(())
}
