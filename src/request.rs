//! HTTP request handlers
//!
//! - `GET /`: the static welcome page (`index.html`, embedded at compile time) served as
//!   `text/html; charset=utf-8`.
//! - anything else: plain-text `404 Not Found`.

use actix_web::{ HttpRequest, HttpResponse, http::header::ContentType };
use log::debug;

/// Heading every deployment of the welcome page must contain.
pub const GREETING: &str = "<h1>Welcome to My CI/CD Demo</h1>";

pub(crate) const INDEX_HTML: &str = include_str!("index.html");

#[actix_web::get("/")]
pub(crate) async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(ContentType::html())
        .body(INDEX_HTML)
}

/// Default service for every unmatched path.
pub(crate) async fn not_found(req: HttpRequest) -> HttpResponse {
    debug!("{} {}: no route", req.method(), req.path());
    HttpResponse::NotFound()
        .insert_header(ContentType::plaintext())
        .body("404 Not Found")
}
