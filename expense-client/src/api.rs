use std::cell::RefCell;
use std::time::Duration;

use async_trait::async_trait;
use awc::error::SendRequestError;
use awc::http::StatusCode;
use awc::{Client, ClientRequest};
use expense_repo::category_repo::{Category, NewCategory};
use expense_repo::transaction_repo::{Filter, NewTransaction, Totals, Transaction};
use expense_repo::user_repo::{UserId, UserProfile};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const RESPONSE_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Request timed out")]
    Timeout,
    #[error("{message} ({status})")]
    Status { status: u16, message: String },
    #[error("Unable to decode response: {0}")]
    Decode(String),
    #[error("Not logged in")]
    Unauthenticated,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// Reads the `{"error": ...}` body the backend sends with every failed request.
    pub fn from_response(status: StatusCode, body: &[u8]) -> ApiError {
        #[derive(Deserialize)]
        struct ErrorBody {
            error: String,
        }

        let message = serde_json::from_slice::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_owned());
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

impl From<SendRequestError> for ApiError {
    fn from(e: SendRequestError) -> Self {
        match e {
            SendRequestError::Timeout => ApiError::Timeout,
            e => ApiError::Request(e.to_string()),
        }
    }
}

#[async_trait(?Send)]
pub trait TransactionApi {
    async fn list_transactions(&self, filter: &Filter) -> Result<Vec<Transaction>, ApiError>;
    async fn delete_transaction(&self, transaction_id: i32) -> Result<Transaction, ApiError>;
}

#[async_trait(?Send)]
pub trait CategoryApi {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;
}

#[derive(Serialize)]
struct Registration<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChange<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// Talks to the backend over HTTP. Logging in stores the token, which is then sent with every
/// request.
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: RefCell<Option<String>>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> HttpClient {
        HttpClient::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> HttpClient {
        let client = Client::builder().timeout(timeout).finish();
        HttpClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: RefCell::new(None),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.borrow().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: ClientRequest) -> Result<ClientRequest, ApiError> {
        match self.token.borrow().as_deref() {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(ApiError::Unauthenticated),
        }
    }

    async fn execute<T, B>(&self, request: ClientRequest, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        debug!(method = %request.get_method(), uri = %request.get_uri(), "Sending request");
        let sent = match body {
            Some(body) => request.send_json(body).await,
            None => request.send().await,
        };
        let mut response = sent?;
        let status = response.status();
        let bytes = response
            .body()
            .limit(RESPONSE_LIMIT)
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::from_response(status, &bytes));
        }
        // 204 responses are read as `null`
        let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ApiError> {
        let request = self.client.post(self.url("/auth/register"));
        let registration = Registration {
            username,
            email,
            password,
        };
        self.execute(request, Some(&registration)).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let request = self.client.post(self.url("/auth/login"));
        let session: Session = self
            .execute(request, Some(&Credentials { email, password }))
            .await?;
        self.set_token(Some(session.token.clone()));
        Ok(session)
    }

    pub fn logout(&self) {
        self.set_token(None);
    }

    pub async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        let request = self.authorized(self.client.get(self.url("/users/profile")))?;
        self.execute::<_, ()>(request, None).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let request = self.authorized(self.client.put(self.url("/users/password")))?;
        let change = PasswordChange {
            current_password,
            new_password,
        };
        self.execute(request, Some(&change)).await
    }

    /// Deletes the account with all its data and forgets the token.
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        let request = self.authorized(self.client.delete(self.url("/users")))?;
        self.execute::<(), ()>(request, None).await?;
        self.logout();
        Ok(())
    }

    pub async fn get_transaction(&self, transaction_id: i32) -> Result<Transaction, ApiError> {
        let path = format!("/transactions/{}", transaction_id);
        let request = self.authorized(self.client.get(self.url(&path)))?;
        self.execute::<_, ()>(request, None).await
    }

    pub async fn create_transaction(
        &self,
        new_transaction: &NewTransaction,
    ) -> Result<Transaction, ApiError> {
        let request = self.authorized(self.client.post(self.url("/transactions")))?;
        self.execute(request, Some(new_transaction)).await
    }

    pub async fn update_transaction(
        &self,
        transaction_id: i32,
        updated_transaction: &NewTransaction,
    ) -> Result<Transaction, ApiError> {
        let path = format!("/transactions/{}", transaction_id);
        let request = self.authorized(self.client.put(self.url(&path)))?;
        self.execute(request, Some(updated_transaction)).await
    }

    pub async fn get_summary(&self, filter: &Filter) -> Result<Totals, ApiError> {
        let request = self
            .authorized(self.client.get(self.url("/transactions/summary")))?
            .query(filter)
            .map_err(|e| ApiError::Request(e.to_string()))?;
        self.execute::<_, ()>(request, None).await
    }

    pub async fn create_category(&self, new_category: &NewCategory) -> Result<Category, ApiError> {
        let request = self.authorized(self.client.post(self.url("/categories")))?;
        self.execute(request, Some(new_category)).await
    }

    pub async fn update_category(
        &self,
        category_id: i32,
        updated_category: &NewCategory,
    ) -> Result<Category, ApiError> {
        let path = format!("/categories/{}", category_id);
        let request = self.authorized(self.client.put(self.url(&path)))?;
        self.execute(request, Some(updated_category)).await
    }

    pub async fn delete_category(&self, category_id: i32) -> Result<Category, ApiError> {
        let path = format!("/categories/{}", category_id);
        let request = self.authorized(self.client.delete(self.url(&path)))?;
        self.execute::<_, ()>(request, None).await
    }
}

#[async_trait(?Send)]
impl TransactionApi for HttpClient {
    #[instrument(skip(self))]
    async fn list_transactions(&self, filter: &Filter) -> Result<Vec<Transaction>, ApiError> {
        let request = self
            .authorized(self.client.get(self.url("/transactions")))?
            .query(filter)
            .map_err(|e| ApiError::Request(e.to_string()))?;
        self.execute::<_, ()>(request, None).await
    }

    #[instrument(skip(self))]
    async fn delete_transaction(&self, transaction_id: i32) -> Result<Transaction, ApiError> {
        let path = format!("/transactions/{}", transaction_id);
        let request = self.authorized(self.client.delete(self.url(&path)))?;
        self.execute::<_, ()>(request, None).await
    }
}

#[async_trait(?Send)]
impl CategoryApi for HttpClient {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let request = self.authorized(self.client.get(self.url("/categories")))?;
        self.execute::<_, ()>(request, None).await
    }
}
