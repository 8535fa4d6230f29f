//! HTTP handlers and route configuration.

mod admin;
mod blog;
mod health;
mod pages;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::{json_error_handler, query_error_handler};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/", web::get().to(pages::landing))
        .service(web::scope("/api").route("/health", web::get().to(health::health_check)))
        .service(
            web::scope("/blog")
                .route("/", web::get().to(blog::list))
                .route("/create_post/", web::get().to(blog::create_form))
                .route("/create_post/", web::post().to(blog::create))
                .route("/update_post/{id:\\d+}/", web::get().to(blog::update_form))
                .route("/update_post/{id:\\d+}/", web::post().to(blog::update))
                .route("/category/{slug}/", web::get().to(blog::category))
                .route("/tag/{slug}/", web::get().to(blog::tag))
                .route("/search/{q}/", web::get().to(blog::search))
                .route("/{id:\\d+}/new_comment/", web::get().to(blog::comment_visit))
                .route("/{id:\\d+}/new_comment/", web::post().to(blog::comment))
                .route("/{id:\\d+}/", web::get().to(blog::detail)),
        )
        .service(
            web::scope("/admin")
                .route("/categories", web::post().to(admin::create_category))
                .route("/tags", web::post().to(admin::create_tag)),
        );
}
