//! HTTP server assembly
//!
//! [`build_app`] is shared by the real server and by in-process tests so both see the same
//! routes and middleware.

use std::net::SocketAddr;

use actix_web::{
    App, HttpServer,
    body::MessageBody,
    dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse},
    http::KeepAlive,
    middleware::{self, Condition},
    web,
};
use log::info;

use crate::{
    cofg::{Cofg, config::CofgMiddleware},
    request,
};

pub fn build_app(
    mw: CofgMiddleware,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(Condition::new(
            mw.normalize_path,
            middleware::NormalizePath::trim(),
        ))
        .wrap(Condition::new(mw.compress, middleware::Compress::default()))
        .wrap(Condition::new(
            mw.logger.enabling,
            middleware::Logger::new(&mw.logger.format),
        ))
        .service(request::index)
        .default_service(web::to(request::not_found))
}

/// Bind the listening socket(s) now; the returned [`Server`] must be awaited or spawned to
/// start accepting.
pub fn http_server(c: &Cofg) -> std::io::Result<(Server, Vec<SocketAddr>)> {
    let mw = c.middleware.clone();
    let mut server = HttpServer::new(move || build_app(mw.clone())).keep_alive(KeepAlive::Os);
    if let Some(workers) = c.workers {
        server = server.workers(workers);
    }
    let server = server.bind(&c.addrs)?;
    let addrs = server.addrs();
    for addr in &addrs {
        info!("run in http://{addr}/");
    }
    Ok((server.run(), addrs))
}
