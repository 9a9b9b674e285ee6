use crate::auth::handlers::require_field;
use crate::auth::password;
use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{web, HttpResponse, Responder};
use expense_repo::user_repo::UserRepo;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[get("/profile")]
pub async fn get_profile(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user = user_repo.get_user(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user.profile()))
}

#[put("/profile")]
pub async fn update_profile(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
    update: web::Json<ProfileUpdate>,
) -> Result<impl Responder, HandlerError> {
    require_field("username", &update.username)?;
    require_field("email", &update.email)?;

    let user = user_repo
        .update_profile(
            user_id.into_inner(),
            update.username.trim(),
            update.email.trim(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(user.profile()))
}

#[put("/password")]
pub async fn change_password(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
    change: web::Json<PasswordChange>,
) -> Result<impl Responder, HandlerError> {
    require_field("newPassword", &change.new_password)?;

    let user = user_repo.get_user(user_id.into_inner()).await?;
    if !password::verify_password(&change.current_password, &user.password_hash)? {
        return Err(HandlerError::InvalidCredentials);
    }

    let password_hash = password::encode_password(&change.new_password)?;
    user_repo.update_password_hash(user.id, &password_hash).await?;
    info!(user_id = user.id, "Changed password");

    Ok(HttpResponse::NoContent().finish())
}

#[delete("")]
pub async fn delete_user(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user_id = user_id.into_inner();
    user_repo.delete_user(user_id).await?;
    info!(user_id, "Deleted user");

    Ok(HttpResponse::NoContent().finish())
}
