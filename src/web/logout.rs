//! Session logout

use crate::session;
use actix_session::Session;
use actix_web::{post, HttpResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(logout);
}

/// POST /auth/logout - drop the session and its cookie
#[post("/auth/logout")]
async fn logout(cookies: Session) -> HttpResponse {
    session::purge(&cookies);

    HttpResponse::NoContent().finish()
}
