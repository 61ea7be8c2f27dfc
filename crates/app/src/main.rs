use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "haulbooks={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let storage = settings.storage;
    let scan = settings.scan.map(|scan| server::ScanConfig {
        url: scan.url,
        api_key: scan.api_key,
    });

    if let Some(server) = settings.server {
        tasks.spawn(async move {
            tracing::info!("Found server settings...");

            let db = match &server.database {
                Some(database) => match parse_database(database).await {
                    Ok(db) => Some(db),
                    Err(err) => {
                        tracing::error!("failed to initialize database: {err}");
                        return;
                    }
                },
                None => None,
            };

            let builder = match &db {
                Some(db) => engine::Engine::builder().database(db.clone()),
                None => {
                    let path = storage
                        .map(|storage| storage.path)
                        .unwrap_or_else(|| "./data".to_string());
                    tracing::info!("no database configured, using local storage at {path}");
                    engine::Engine::builder().local_store(engine::LocalStore::new(path))
                }
            };
            let engine = match builder.build().await {
                Ok(engine) => engine,
                Err(err) => {
                    tracing::error!("failed to build engine: {err}");
                    return;
                }
            };

            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(engine, db, scan, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
