//! Public map page and the visible-reports API feeding it.

use crate::db::get_db_pool;
use crate::reports;
use actix_web::{error, get, Error, HttpResponse, Responder};
use askama::Template;
use askama_actix::TemplateToResponse;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_map).service(get_visible_reports);
}

#[derive(Template)]
#[template(path = "map.html")]
struct MapTemplate {}

/// Page shell only; the map fetches its data from /api/reports.
#[get("/map")]
async fn view_map() -> impl Responder {
    MapTemplate {}.to_response()
}

/// JSON array of publicly visible reports.
///
/// Everything unresolved, plus reports resolved less than 24 hours ago.
#[get("/api/reports")]
async fn get_visible_reports() -> Result<HttpResponse, Error> {
    let all = reports::all_reports(get_db_pool())
        .await
        .map_err(error::ErrorInternalServerError)?;

    let now = chrono::Local::now().naive_local();
    let visible = reports::filter_visible(all, now);

    Ok(HttpResponse::Ok().json(visible))
}
