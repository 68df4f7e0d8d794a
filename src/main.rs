use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use lifegroup_finder::config::Settings;
use lifegroup_finder::core::GroupFinder;
use lifegroup_finder::routes::{self, groups::AppState};
use lifegroup_finder::services::{NominatimClient, Notifier, RosterCache, RosterLoader, RosterService, RosterSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn io_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| io_error("Configuration error", e))?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting LifeGroup Finder...");
    info!("Configuration loaded successfully");

    let geocoding = &settings.geocoding;
    let geocoder = Arc::new(
        NominatimClient::new(
            geocoding.endpoint.clone(),
            geocoding.user_agent.clone(),
            Duration::from_secs(geocoding.request_timeout_secs),
            Duration::from_secs(geocoding.roster_timeout_secs),
            geocoding.country_hint.clone(),
            geocoding.region_hint.clone(),
        )
        .map_err(|e| io_error("Geocoder setup failed", e))?,
    );

    info!("Geocoder initialized ({})", geocoding.endpoint);

    let source = RosterSource::parse(&settings.roster.source);
    let loader = RosterLoader::new(
        source.clone(),
        geocoder.clone(),
        Duration::from_secs(settings.roster.download_timeout_secs),
        Duration::from_millis(geocoding.lookup_interval_ms),
    )
    .map_err(|e| io_error("Roster loader setup failed", e))?;

    let cache = RosterCache::new(settings.roster.cache_ttl_secs, 16);
    let roster = Arc::new(RosterService::new(loader, cache));

    info!("Roster source: {} (TTL: {}s)", source.identity(), settings.roster.cache_ttl_secs);

    let notifier = Arc::new(
        Notifier::new(settings.notifications.notifier_settings())
            .map_err(|e| io_error("Notifier setup failed", e))?,
    );

    if settings.notifications.webhook_url.as_deref().map_or(true, str::is_empty) {
        warn!("No notification webhook configured; only messaging links will work");
    }

    let finder = GroupFinder::new(settings.search.showcase_limit);

    // Warm the roster cache so the first visitor does not wait for geocoding
    let (warm, warm_error) = roster.current_or_empty().await;
    match warm_error {
        None => info!("Roster ready with {} groups", warm.groups.len()),
        Some(e) => error!("Roster unavailable at startup, will retry on demand: {}", e),
    }

    // Build application state
    let app_state = AppState {
        roster,
        geocoder,
        notifier,
        finder,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
