use actix_web::web;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/chat")
            .route(web::post().to(handlers::chat))
            .default_service(web::to(handlers::fallback)),
    )
    .default_service(web::to(handlers::fallback));
}
