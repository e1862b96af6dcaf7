use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use financas::{error::StoreError, routes, settings::Settings, store::Stores};

#[derive(Error, Debug)]
enum StartupError {
    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("failed to open the store: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    let settings = Settings::new()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "financas={level},actix_web={level},actix_server={level}",
            level = settings.log.level
        ))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let stores = Stores::connect(&settings.database).await?;
    tracing::info!("Connected");

    let addr = (settings.server.bind.clone(), settings.server.port);
    tracing::info!("Listening on {}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(routes::configure(stores.clone()))
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
