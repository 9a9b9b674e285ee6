use crate::auth::jwt::JWTAuth;
use crate::auth::password;
use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use anyhow::anyhow;
use expense_repo::user_repo::{NewUser, UserRepo, UserRepoError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub id: UserId,
    pub username: String,
    pub email: String,
}

pub(crate) fn require_field(name: &str, value: &str) -> Result<(), HandlerError> {
    if value.trim().is_empty() {
        return Err(HandlerError::BadRequest(format!("{} must not be empty", name)));
    }
    Ok(())
}

#[post("/register")]
pub async fn register(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    request: web::Json<RegisterRequest>,
) -> Result<impl Responder, HandlerError> {
    let request = request.into_inner();
    require_field("username", &request.username)?;
    require_field("email", &request.email)?;
    require_field("password", &request.password)?;

    let password_hash = password::encode_password(&request.password)?;
    let user = user_repo
        .create_user(NewUser::new(
            request.username.trim().to_owned(),
            request.email.trim().to_owned(),
            password_hash,
        ))
        .await?;
    info!(user_id = user.id, "Registered user");

    Ok(HttpResponse::Created().json(user.profile()))
}

#[post("/login")]
pub async fn login(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    request: web::Json<LoginRequest>,
    req: HttpRequest,
) -> Result<impl Responder, HandlerError> {
    let request = request.into_inner();

    let user = match user_repo.get_user_by_email(request.email.trim()).await {
        Ok(user) => user,
        Err(UserRepoError::EmailNotRegistered(_)) => return Err(HandlerError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };

    if !password::verify_password(&request.password, &user.password_hash)? {
        return Err(HandlerError::InvalidCredentials);
    }

    let jwt_auth = req
        .app_data::<JWTAuth>()
        .ok_or_else(|| anyhow!("JWTAuth is not registered as app data"))?;
    let token = jwt_auth.create_token(user.id)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}
