mod handlers;

use actix_web::{web, Scope};

pub use expense_repo::user_repo::UserId;

pub fn user_service() -> Scope {
    web::scope("/users")
        .service(handlers::get_profile)
        .service(handlers::update_profile)
        .service(handlers::change_password)
        .service(handlers::delete_user)
}
