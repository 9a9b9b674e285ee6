#[macro_use]
extern crate actix_web;

use actix_web::web::{Data, ServiceConfig};
use actix_web_httpauth::middleware::HttpAuthentication;
use expense_repo::Repos;

use crate::auth::jwt::JWTAuth;

pub mod auth;
pub mod category;
pub mod config;
pub mod error;
pub mod health;
pub mod tracing;
pub mod transaction;
pub mod user;

/// Registers the shared state, extractor error handlers and every route. The data routes are
/// wrapped in bearer token authentication.
pub fn configure_app(
    jwt_auth: JWTAuth,
    repos: Repos,
    signups_enabled: bool,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let bearer_auth_middleware = HttpAuthentication::bearer(auth::credentials_validator);

        cfg.app_data(jwt_auth)
            .app_data(Data::new(repos.users))
            .app_data(Data::new(repos.categories))
            .app_data(Data::new(repos.transactions))
            .app_data(Data::new(repos.health))
            .app_data(error::json_config())
            .app_data(error::query_config())
            .app_data(error::path_config())
            .service(health::health)
            .service(auth::auth_service(signups_enabled))
            .service(user::user_service().wrap(bearer_auth_middleware.clone()))
            .service(category::category_service().wrap(bearer_auth_middleware.clone()))
            .service(transaction::transaction_service().wrap(bearer_auth_middleware));
    }
}

/// The browser frontend is served from a different origin.
pub fn create_cors() -> actix_cors::Cors {
    actix_cors::Cors::permissive()
}
