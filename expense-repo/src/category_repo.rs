use crate::transaction_repo::TransactionType;
use crate::user_repo::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories are stored per user. Renaming or deleting a category rewrites the category of the
/// user's transactions that referred to it by name.
#[async_trait]
pub trait CategoryRepo: Sync + Send {
    async fn get_categories(&self, user: UserId) -> Result<Vec<Category>, CategoryRepoError>;

    async fn create_category(
        &self,
        user: UserId,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError>;

    /// Transactions using the old name are moved to the new name.
    async fn update_category(
        &self,
        user: UserId,
        category_id: i32,
        updated_category: NewCategory,
    ) -> Result<Category, CategoryRepoError>;

    /// Transactions using the deleted category are moved to
    /// [UNCATEGORIZED](crate::transaction_repo::UNCATEGORIZED).
    async fn delete_category(
        &self,
        user: UserId,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError>;
}

#[derive(Error, Debug)]
pub enum CategoryRepoError {
    #[error("Category with id {0} not found")]
    CategoryNotFound(i32),
    #[error("Category {0} already exists")]
    CategoryAlreadyExists(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Category {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

impl Category {
    pub const fn new(id: i32, name: String, category_type: TransactionType) -> Category {
        Category {
            id,
            name,
            category_type,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

impl NewCategory {
    pub const fn new(name: String, category_type: TransactionType) -> NewCategory {
        NewCategory {
            name,
            category_type,
        }
    }

    /// Category names are stored trimmed and lower-cased.
    pub fn normalized_name(&self) -> Result<String, CategoryRepoError> {
        let name = self.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(CategoryRepoError::InvalidCategory(
                "name must not be empty".to_owned(),
            ));
        }
        Ok(name)
    }

    pub fn to_category(&self, id: i32) -> Result<Category, CategoryRepoError> {
        Ok(Category::new(id, self.normalized_name()?, self.category_type))
    }
}
