//! Landing page.

use crate::app_config;
use actix_web::{get, Responder};
use askama::Template;
use askama_actix::TemplateToResponse;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index);
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    site_name: String,
    site_description: String,
}

#[get("/")]
async fn view_index() -> impl Responder {
    let site = app_config::site();
    IndexTemplate {
        site_name: site.name,
        site_description: site.description,
    }
    .to_response()
}
