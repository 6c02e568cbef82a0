//! Operator review flow.
//!
//! Login sets an `admin` flag in the cookie session; every other route here
//! checks the flag via [`AdminCtx`] and silently redirects to the login
//! screen when it is absent. Status transitions are unordered and
//! last-write-wins; `updated_at` moves on every edit, changed or not.

use super::report::read_upload_form;
use crate::db::get_db_pool;
use crate::middleware::AdminCtx;
use crate::orm::reports as reports_orm;
use crate::reports::{self, Status, StatusCounts};
use crate::storage::{sanitize_filename, StorageBackend};
use crate::{auth, auth::Credentials};
use actix_multipart::Multipart;
use actix_web::{error, get, post, web, web::Data, Error, HttpResponse, Responder};
use askama::Template;
use askama_actix::TemplateToResponse;
use serde::Deserialize;
use std::sync::Arc;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_login)
        .service(post_login)
        .service(logout)
        .service(view_dashboard)
        .service(view_reports)
        .service(view_report_detail)
        .service(update_report);
}

#[derive(Template)]
#[template(path = "admin/login.html")]
struct LoginTemplate {
    error: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[get("/admin/login")]
async fn view_login() -> impl Responder {
    LoginTemplate { error: None }.to_response()
}

#[post("/admin/login")]
async fn post_login(
    session: actix_session::Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, Error> {
    let credentials = auth::ConfigCredentials::from_app_config();

    if credentials.verify(&form.username, &form.password) {
        auth::set_admin(&session)?;
        return Ok(HttpResponse::Found()
            .append_header(("Location", "/admin/dashboard"))
            .finish());
    }

    log::warn!("Failed operator login attempt for '{}'", form.username);
    let body = LoginTemplate {
        error: Some("Invalid credentials.".to_string()),
    }
    .render()
    .map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Unauthorized()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

#[get("/admin/logout")]
async fn logout(session: actix_session::Session) -> impl Responder {
    auth::clear_admin(&session);
    HttpResponse::Found()
        .append_header(("Location", "/"))
        .finish()
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
struct DashboardTemplate {
    counts: StatusCounts,
    latest_reports: Vec<reports_orm::Model>,
}

/// Summary counts plus the five most recently created reports.
#[get("/admin/dashboard")]
async fn view_dashboard(client: AdminCtx) -> Result<HttpResponse, Error> {
    if let Err(redirect) = client.require() {
        return Ok(redirect);
    }

    let db = get_db_pool();
    let counts = reports::status_counts(db)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let latest_reports = reports::latest_reports(db, 5)
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(DashboardTemplate {
        counts,
        latest_reports,
    }
    .to_response())
}

#[derive(Template)]
#[template(path = "admin/reports.html")]
struct ReportsListTemplate {
    reports: Vec<reports_orm::Model>,
}

/// All reports, newest first.
#[get("/admin/reports")]
async fn view_reports(client: AdminCtx) -> Result<HttpResponse, Error> {
    if let Err(redirect) = client.require() {
        return Ok(redirect);
    }

    let reports = reports::all_reports(get_db_pool())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(ReportsListTemplate { reports }.to_response())
}

#[derive(Template)]
#[template(path = "admin/report_detail.html")]
struct ReportDetailTemplate {
    report: Option<reports_orm::Model>,
}

#[get("/admin/report/{id}")]
async fn view_report_detail(
    client: AdminCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    if let Err(redirect) = client.require() {
        return Ok(redirect);
    }

    let report = reports::find_report(get_db_pool(), &path.into_inner())
        .await
        .map_err(error::ErrorInternalServerError)?;

    Ok(ReportDetailTemplate { report }.to_response())
}

/// Apply a status update, optionally attaching a cleanup photo.
///
/// With a cleanup image: save it and set status, cleanup_image_path, and
/// updated_at in one update. Without: status and updated_at only.
#[post("/admin/report/{id}")]
async fn update_report(
    client: AdminCtx,
    path: web::Path<String>,
    storage: Data<Arc<dyn StorageBackend>>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    if let Err(redirect) = client.require() {
        return Ok(redirect);
    }

    let id = path.into_inner();
    let max_bytes = crate::app_config::storage().max_upload_size_mb as usize * 1024 * 1024;
    let form = read_upload_form(payload, max_bytes).await?;

    let status = form
        .text("status")
        .and_then(Status::from_str)
        .ok_or_else(|| error::ErrorBadRequest("Invalid status value"))?;

    let cleanup_filename = match form.file("cleanup_image") {
        Some((original_name, bytes)) => {
            let filename = sanitize_filename(&format!("cleanup_{}_{}", id, original_name));
            storage
                .put_object(bytes.clone(), &filename)
                .await
                .map_err(error::ErrorInternalServerError)?;
            Some(filename)
        }
        None => None,
    };

    let updated = reports::update_status(get_db_pool(), &id, status, cleanup_filename)
        .await
        .map_err(error::ErrorInternalServerError)?;

    if let Some(report) = &updated {
        log::info!("Report {} set to {}", report.id, report.status);
    }

    // Back to the detail view; an unknown id renders its not-found state.
    Ok(HttpResponse::Found()
        .append_header(("Location", format!("/admin/report/{}", id)))
        .finish())
}
