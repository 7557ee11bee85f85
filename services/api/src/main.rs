use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::{
    codes::CodeStore,
    jwt::{JwtConfig, JwtService},
    mailer::Mailer,
    repositories::{PlaceRepository, UserRepository},
    routes,
    state::AppState,
};
use common::database::{health_check, init_pool, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Routes4Life API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!().run(&pool).await?;
    info!("Database migrations applied");

    // Initialize services
    let jwt = JwtService::new(JwtConfig::from_env()?);
    let codes = CodeStore::new();
    let mailer = Mailer::from_env()?;

    let users = UserRepository::new(pool.clone());
    let places = PlaceRepository::new(pool);

    let app_state = AppState {
        users,
        places,
        jwt,
        codes,
        mailer,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
