//! Citizen status lookup by report id.
//!
//! One id in, one row (or nothing) out. Unauthenticated citizens get no
//! listing beyond the public map.

use crate::db::get_db_pool;
use crate::orm::reports as reports_orm;
use crate::reports;
use actix_web::{error, get, post, web, Error, Responder};
use askama::Template;
use askama_actix::TemplateToResponse;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_status_form).service(post_status_lookup);
}

#[derive(Template)]
#[template(path = "status.html")]
struct StatusTemplate {
    queried: bool,
    report: Option<reports_orm::Model>,
}

#[derive(Deserialize)]
struct StatusForm {
    report_id: String,
}

#[get("/status")]
async fn view_status_form() -> impl Responder {
    StatusTemplate {
        queried: false,
        report: None,
    }
    .to_response()
}

#[post("/status")]
async fn post_status_lookup(form: web::Form<StatusForm>) -> Result<impl Responder, Error> {
    let report = reports::find_report(get_db_pool(), form.report_id.trim())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(StatusTemplate {
        queried: true,
        report,
    }
    .to_response())
}
