//! HTTP handlers and route configuration.

mod articles;
mod auth;
mod authors;
mod categories;
mod health;
mod news;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/me", web::patch().to(auth::update_profile))
                    .route("/upgrade", web::post().to(auth::upgrade)),
            )
            // News and articles are the same entity routed by kind
            .service(
                web::scope("/news")
                    .route("", web::get().to(news::list))
                    .route("", web::post().to(news::create))
                    .route("/{id}", web::get().to(news::get))
                    .route("/{id}", web::put().to(news::update))
                    .route("/{id}", web::delete().to(news::delete)),
            )
            .service(
                web::scope("/articles")
                    .route("", web::post().to(articles::create))
                    .route("/{id}", web::put().to(articles::update))
                    .route("/{id}", web::delete().to(articles::delete)),
            )
            .service(
                web::scope("/posts")
                    .route("/search", web::get().to(posts::search))
                    .route("/{id}/like", web::post().to(posts::like))
                    .route("/{id}/dislike", web::post().to(posts::dislike))
                    .route("/{id}/comments", web::get().to(posts::list_comments))
                    .route("/{id}/comments", web::post().to(posts::create_comment)),
            )
            .service(
                web::scope("/comments")
                    .route("/{id}/like", web::post().to(posts::like_comment))
                    .route("/{id}/dislike", web::post().to(posts::dislike_comment)),
            )
            .service(
                web::scope("/categories")
                    .route("/{id}", web::get().to(categories::get))
                    .route("/{id}/subscribe", web::post().to(categories::subscribe)),
            )
            .service(
                web::scope("/authors")
                    .route("/{id}", web::get().to(authors::get))
                    .route(
                        "/{id}/rating/recompute",
                        web::post().to(authors::recompute_rating),
                    ),
            ),
    );
}
