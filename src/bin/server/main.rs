use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dumpwatch::db::{get_db_pool, init_db};
use dumpwatch::storage::{LocalStorage, StorageBackend};
use env_logger::Env;
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    dumpwatch::app_config::init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://database.db?mode=rwc".to_string());
    init_db(database_url).await;

    dumpwatch::migrate::run_migrations(get_db_pool())
        .await
        .expect("Schema migration failed.");

    let config = dumpwatch::app_config::get_config();
    dumpwatch::rate_limit::init_rate_limits(&config);

    let storage: Arc<dyn StorageBackend> = Arc::new(
        LocalStorage::from_app_config().expect("Failed to initialize upload storage."),
    );
    let uploads_path = config.storage.uploads_path.clone();

    let secret_key = match std::env::var("SECRET_KEY") {
        Ok(key) => Key::from(key.as_bytes()),
        Err(err) => {
            let random_string: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!("SECRET_KEY was invalid. Reason: {:?}\r\nThis means the key used for signing session cookies will invalidate every time the application is restarted. A secret key must be at least 64 bytes to be accepted.\r\nNeed a key? How about:\r\n{}", err, random_string);
            Key::from(random_string.as_bytes())
        }
    };

    // Spawn rate limiter cleanup task
    actix_web::rt::spawn(async {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(300)); // Every 5 minutes
        loop {
            interval.tick().await;
            dumpwatch::rate_limit::cleanup_old_entries_public();
            log::debug!("Rate limiter cleanup completed");
        }
    });

    let listen = config.site.listen.clone();
    log::info!("Listening on {}", listen);

    HttpServer::new(move || {
        let storage_data: Data<Arc<dyn StorageBackend>> = Data::new(storage.clone());

        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(storage_data)
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(false) // Allow HTTP for development
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(dumpwatch::web::configure)
            .service(actix_files::Files::new("/uploads", uploads_path.clone()))
            .service(actix_files::Files::new("/static", "./static"))
    })
    .bind(listen)?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
