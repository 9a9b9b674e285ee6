use crate::error::HandlerError;
use crate::user::UserId;
use actix_web::{web, HttpResponse, Responder};
use expense_repo::transaction_repo::{Filter, NewTransaction, TransactionRepo};
use std::sync::Arc;
use tracing::debug;

#[get("/{transaction_id}")]
pub async fn get_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .get_transaction(user_id.into_inner(), transaction_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[get("")]
pub async fn get_all_transactions(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    filter: web::Query<Filter>,
) -> Result<impl Responder, HandlerError> {
    let filter = filter.into_inner();
    debug!(?filter, "Listing transactions");
    let transactions = transaction_repo
        .get_all_transactions(user_id.into_inner(), filter)
        .await?;
    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/summary")]
pub async fn get_summary(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    filter: web::Query<Filter>,
) -> Result<impl Responder, HandlerError> {
    let totals = transaction_repo
        .get_totals(user_id.into_inner(), filter.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(totals))
}

#[post("")]
pub async fn create_new_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    new_transaction: web::Json<NewTransaction>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .create_new_transaction(user_id.into_inner(), new_transaction.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(transaction))
}

#[put("/{transaction_id}")]
pub async fn update_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
    updated_transaction: web::Json<NewTransaction>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .update_transaction(
            user_id.into_inner(),
            transaction_id.into_inner(),
            updated_transaction.into_inner(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}

#[delete("/{transaction_id}")]
pub async fn delete_transaction(
    transaction_repo: web::Data<Arc<dyn TransactionRepo>>,
    user_id: web::ReqData<UserId>,
    transaction_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let transaction = transaction_repo
        .delete_transaction(user_id.into_inner(), transaction_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(transaction))
}
