//! HTTP handlers and route configuration.

mod accounts;
mod auth;
mod comments;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
///
/// Literal segments such as `/create` and `/comments` are registered before
/// the numeric `/{id}` patterns.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            ),
    )
    .service(
        web::scope("/accounts")
            .service(
                web::resource("/login")
                    .route(web::get().to(accounts::login_form))
                    .route(web::post().to(accounts::login)),
            )
            .route("/logout", web::post().to(accounts::logout)),
    )
    .route("/", web::get().to(posts::list))
    .service(
        web::resource("/create")
            .route(web::get().to(posts::create_form))
            .route(web::post().to(posts::create)),
    )
    .route(r"/comments/{id:\d+}", web::get().to(comments::detail))
    .service(
        web::resource(r"/comments/{id:\d+}/update")
            .route(web::get().to(comments::update_form))
            .route(web::post().to(comments::update)),
    )
    .service(
        web::resource(r"/comments/{id:\d+}/delete")
            .route(web::get().to(comments::delete_form))
            .route(web::post().to(comments::delete)),
    )
    .service(
        web::resource(r"/{id:\d+}")
            .route(web::get().to(posts::detail))
            .route(web::post().to(posts::comment)),
    )
    .service(
        web::resource(r"/{id:\d+}/update")
            .route(web::get().to(posts::update_form))
            .route(web::post().to(posts::update)),
    )
    .service(
        web::resource(r"/{id:\d+}/delete")
            .route(web::get().to(posts::delete_form))
            .route(web::post().to(posts::delete)),
    )
    .route(r"/{id:\d+}/comments", web::get().to(comments::list_for_post))
    .service(
        web::resource(r"/{id:\d+}/comments/create")
            .route(web::get().to(comments::create_form))
            .route(web::post().to(comments::create)),
    );
}
