use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{web, HttpResponse, Responder};
use expense_repo::category_repo::{CategoryRepo, NewCategory};
use std::sync::Arc;

#[get("")]
pub async fn get_all_categories(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let categories = category_repo.get_categories(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[post("")]
pub async fn create_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    new_category: web::Json<NewCategory>,
) -> Result<impl Responder, HandlerError> {
    let category = category_repo
        .create_category(user_id.into_inner(), new_category.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(category))
}

#[put("/{category_id}")]
pub async fn update_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
    updated_category: web::Json<NewCategory>,
) -> Result<impl Responder, HandlerError> {
    let category = category_repo
        .update_category(
            user_id.into_inner(),
            category_id.into_inner(),
            updated_category.into_inner(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/{category_id}")]
pub async fn delete_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let category = category_repo
        .delete_category(user_id.into_inner(), category_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}
