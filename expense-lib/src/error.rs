use actix_web::body::BoxBody;
use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use expense_repo::category_repo::CategoryRepoError;
use expense_repo::transaction_repo::TransactionRepoError;
use expense_repo::user_repo::UserRepoError;
use serde_json::json;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Transaction(#[from] TransactionRepoError),
    #[error(transparent)]
    Category(#[from] CategoryRepoError),
    #[error(transparent)]
    User(#[from] UserRepoError),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    BadRequest(String),
    #[error("Unable to hash password")]
    Password(#[from] argon2::Error),
    #[error("Unable to create token")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Transaction(e) => match e {
                TransactionRepoError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
                TransactionRepoError::InvalidTransaction(_) => StatusCode::BAD_REQUEST,
                TransactionRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::Category(e) => match e {
                CategoryRepoError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
                CategoryRepoError::CategoryAlreadyExists(_) => StatusCode::CONFLICT,
                CategoryRepoError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
                CategoryRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::User(e) => match e {
                UserRepoError::UserNotFound(_) => StatusCode::NOT_FOUND,
                UserRepoError::EmailNotRegistered(_) => StatusCode::UNAUTHORIZED,
                UserRepoError::EmailAlreadyRegistered(_) => StatusCode::CONFLICT,
                UserRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            HandlerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            HandlerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HandlerError::Password(_) | HandlerError::Token(_) | HandlerError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(error = ?self, "Request failed");
            "Internal server error".to_owned()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(json!({ "error": message }))
    }
}

fn bad_request<E>(message: &str, cause: E) -> actix_web::Error
where
    E: Debug + Display + 'static,
{
    let error_body = json!({
        "error": message,
        "detail": cause.to_string(),
    });
    InternalError::from_response(cause, HttpResponse::BadRequest().json(error_body)).into()
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    error!(req_path = req.path(), %err);
    match err {
        JsonPayloadError::Deserialize(deserialize_err) => {
            bad_request("Unable to parse JSON payload", deserialize_err)
        }
        _ => err.into(),
    }
}

fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    error!(req_path = req.path(), %err);
    match err {
        QueryPayloadError::Deserialize(deserialize_err) => {
            bad_request("Unable to parse query parameters", deserialize_err)
        }
        _ => err.into(),
    }
}

fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    error!(req_path = req.path(), %err);
    match err {
        PathError::Deserialize(deserialize_err) => {
            bad_request("Unable to parse path parameters", deserialize_err)
        }
        _ => err.into(),
    }
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error_handler)
}
