pub mod admin;
pub mod index;
pub mod map;
pub mod report;
pub mod status;

use actix_session::Session;

const FLASH_SESSION_KEY: &str = "flash";

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    index::configure(conf);
    report::configure(conf);
    map::configure(conf);
    status::configure(conf);
    admin::configure(conf);
}

/// Store a one-shot message shown on the next form render.
pub fn set_flash(session: &Session, message: &str) {
    if session.insert(FLASH_SESSION_KEY, message.to_string()).is_err() {
        log::warn!("Failed to store flash message in session");
    }
}

/// Take and clear the pending flash message, if any.
pub fn take_flash(session: &Session) -> Option<String> {
    let message = session.get::<String>(FLASH_SESSION_KEY).ok().flatten();
    if message.is_some() {
        session.remove(FLASH_SESSION_KEY);
    }
    message
}
