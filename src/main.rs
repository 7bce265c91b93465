use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use doggr::config::{Settings, StorageBackend};
use doggr::core::WordListSource;
use doggr::error::handle_json_payload_error;
use doggr::routes::{self, AppState};
use doggr::services::{MemoryStore, PostgresStore, Store};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Doggr backend...");

    match settings.database.backend {
        StorageBackend::Postgres => {
            let store = PostgresStore::from_settings(
                &settings.database.url,
                settings.database.max_connections,
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e)
            })?;

            info!(
                "PostgreSQL store initialized (max: {} connections)",
                settings.database.max_connections.unwrap_or(10)
            );
            serve(settings, store).await
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store; data is lost on shutdown");
            serve(settings, MemoryStore::new()).await
        }
    }
}

async fn serve<S: Store>(settings: Settings, store: S) -> std::io::Result<()> {
    let admin = settings.admin_credentials();
    if !admin.is_configured() {
        warn!("ADMIN_USER/ADMIN_PASS not set; administrative requests will be rejected");
    }

    let filter = settings.profanity_filter();
    match filter.source() {
        WordListSource::File(path) => info!("Screening messages against {}", path.display()),
        WordListSource::Inline(words) if words.is_empty() => {
            warn!("No word list configured; messages are not screened")
        }
        WordListSource::Inline(words) => info!("Screening messages against {} inline entries", words.len()),
    }

    let policy = settings.auth_policy();
    info!("Authorization policy: {:?}", policy);

    let app_state = AppState::new(store, admin, filter, policy);

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes::<S>)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
