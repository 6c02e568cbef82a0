//! Operator context extractor.
//!
//! Every admin route takes an `AdminCtx` parameter; it reads the session
//! once at extraction time. Routes call `require()` first and return the
//! redirect it produces when the caller is not authenticated. The gate is
//! silent: no error message, just a bounce to the login screen.

use crate::auth;
use actix_session::SessionExt;
use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpRequest, HttpResponse};
use std::future::{ready, Ready};

/// Per-request operator context, derived from the cookie session.
#[derive(Clone, Debug)]
pub struct AdminCtx {
    authenticated: bool,
}

impl AdminCtx {
    pub fn is_admin(&self) -> bool {
        self.authenticated
    }

    /// Gate an admin route. `Err` carries the redirect to the login screen.
    pub fn require(&self) -> Result<(), HttpResponse> {
        if self.authenticated {
            Ok(())
        } else {
            Err(redirect_to_login())
        }
    }
}

/// The response every unauthenticated admin request receives.
pub fn redirect_to_login() -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", "/admin/login"))
        .finish()
}

impl FromRequest for AdminCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.get_session();
        ready(Ok(AdminCtx {
            authenticated: auth::is_admin(&session),
        }))
    }
}
