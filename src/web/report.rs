//! Citizen report submission.
//!
//! `GET /report` issues an arithmetic CAPTCHA and renders the form.
//! `POST /report` runs, in order: per-IP rate limit, CAPTCHA check
//! (consume-on-check), field validation, image requirement, image save,
//! row insert. Every early exit leaves no partial state behind.

use crate::db::get_db_pool;
use crate::rate_limit::check_report_rate_limit;
use crate::reports::{self, NewReport};
use crate::storage::{sanitize_filename, StorageBackend};
use crate::{captcha, web};
use actix_multipart::Multipart;
use actix_web::{error, get, post, web::Data, Error, HttpRequest, HttpResponse, Responder};
use askama::Template;
use askama_actix::TemplateToResponse;
use futures_util::TryStreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

const RATE_LIMIT_MESSAGE: &str =
    "Rate limit exceeded. Please wait a moment before reporting again.";
const CAPTCHA_MESSAGE: &str = "Incorrect CAPTCHA answer. Are you human?";
const IMAGE_MESSAGE: &str = "A photo of the site is required.";
const FIELDS_MESSAGE: &str = "Please fill in all required fields.";

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_report_form).service(post_report);
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate {
    captcha_question: Option<String>,
    success_id: Option<String>,
    error: Option<String>,
}

/// A parsed multipart form: text fields plus at most one file per field name.
pub(super) struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, (String, Vec<u8>)>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A file field counts only when a filename was actually supplied.
    pub fn file(&self, name: &str) -> Option<&(String, Vec<u8>)> {
        self.files.get(name).filter(|(name, _)| !name.is_empty())
    }
}

/// Read an entire multipart payload into memory.
///
/// Uploads are synchronous by design; the request blocks until its image is
/// collected. `max_bytes` caps any single file.
pub(super) async fn read_upload_form(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<UploadForm, Error> {
    let mut form = UploadForm {
        fields: HashMap::new(),
        files: HashMap::new(),
    };

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if data.len() + chunk.len() > max_bytes {
                return Err(error::ErrorPayloadTooLarge("Uploaded file is too large"));
            }
            data.extend_from_slice(&chunk);
        }

        match filename {
            Some(filename) => {
                form.files.insert(name, (filename, data));
            }
            None => {
                let value = String::from_utf8(data)
                    .map_err(|_| error::ErrorBadRequest("Form field was not valid UTF-8"))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Required text fields of a submission.
#[derive(Validate)]
struct SubmissionFields {
    #[validate(length(min = 1, max = 2000))]
    description: String,
    #[validate(length(min = 1, max = 200))]
    location_name: String,
    #[validate(length(min = 1, max = 32))]
    severity: String,
}

impl SubmissionFields {
    fn from_form(form: &UploadForm) -> Self {
        let text = |name: &str| form.text(name).unwrap_or_default().trim().to_string();
        Self {
            description: text("description"),
            location_name: text("location_name"),
            severity: text("severity"),
        }
    }
}

fn optional_coordinate(form: &UploadForm, name: &str) -> f64 {
    form.text(name)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0.0)
}

fn redirect_to_form() -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", "/report"))
        .finish()
}

fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

#[get("/report")]
async fn view_report_form(session: actix_session::Session) -> Result<impl Responder, Error> {
    let challenge = captcha::issue(&session).map_err(error::ErrorInternalServerError)?;

    Ok(ReportTemplate {
        captcha_question: Some(challenge.question),
        success_id: None,
        error: web::take_flash(&session),
    }
    .to_response())
}

#[post("/report")]
async fn post_report(
    req: HttpRequest,
    session: actix_session::Session,
    storage: Data<Arc<dyn StorageBackend>>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    // Rate cap per origin, checked before any business logic.
    if let Err(e) = check_report_rate_limit(&client_ip(&req)) {
        log::info!(
            "Report submission rate limited, retry in {}s",
            e.retry_after_seconds
        );
        let body = ReportTemplate {
            captcha_question: None,
            success_id: None,
            error: Some(RATE_LIMIT_MESSAGE.to_string()),
        }
        .render()
        .map_err(error::ErrorInternalServerError)?;
        return Ok(HttpResponse::TooManyRequests()
            .content_type("text/html; charset=utf-8")
            .body(body));
    }

    let max_bytes = crate::app_config::storage().max_upload_size_mb as usize * 1024 * 1024;
    let form = read_upload_form(payload, max_bytes).await?;

    // CAPTCHA first; the stored answer is consumed whatever the outcome, so
    // nothing below runs twice for one challenge.
    if let Err(e) = captcha::verify_and_consume(&session, form.text("captcha_answer")) {
        log::debug!("Submission rejected: {}", e);
        web::set_flash(&session, CAPTCHA_MESSAGE);
        return Ok(redirect_to_form());
    }

    let fields = SubmissionFields::from_form(&form);
    if fields.validate().is_err() {
        web::set_flash(&session, FIELDS_MESSAGE);
        return Ok(redirect_to_form());
    }

    // Exactly one uploaded image, with a real filename.
    let (original_name, image_bytes) = match form.file("image") {
        Some((name, bytes)) => (name.clone(), bytes.clone()),
        None => {
            web::set_flash(&session, IMAGE_MESSAGE);
            return Ok(redirect_to_form());
        }
    };

    let report_id = reports::new_report_id();
    let filename = sanitize_filename(&format!("{}_{}", report_id, original_name));

    storage
        .put_object(image_bytes, &filename)
        .await
        .map_err(error::ErrorInternalServerError)?;

    let report = reports::create_report(
        get_db_pool(),
        NewReport {
            id: report_id,
            description: fields.description,
            location_name: fields.location_name,
            severity: fields.severity,
            latitude: optional_coordinate(&form, "latitude"),
            longitude: optional_coordinate(&form, "longitude"),
            image_path: filename,
        },
    )
    .await
    .map_err(error::ErrorInternalServerError)?;

    log::info!("New report {} at {}", report.id, report.location_name);

    Ok(ReportTemplate {
        captcha_question: None,
        success_id: Some(report.id),
        error: None,
    }
    .to_response())
}
