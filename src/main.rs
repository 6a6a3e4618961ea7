use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;

use taskboard::auth::SessionTokenAuthority;
use taskboard::config::Config;
use taskboard::routes::{self, health};
use taskboard::store::{MemoryStore, PgStore, Store};

async fn build_store(config: &Config) -> io::Result<Arc<dyn Store>> {
    let Some(database_url) = config.database_url.as_deref() else {
        log::warn!("DATABASE_URL not set; using the in-memory store, data will not persist");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Failed to connect to database: {}", e)))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Failed to run migrations: {}", e)))?;

    Ok(Arc::new(PgStore::new(pool)))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e));
        }
    };

    let store = build_store(&config).await?;
    let authority = Arc::new(SessionTokenAuthority::new(&config.signing_secret));

    log::info!("Starting taskboard server at {}", config.server_url());
    HttpServer::new(move || {
        let store = store.clone();
        let authority = authority.clone();
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(move |cfg| routes::config(cfg, store, authority)))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
