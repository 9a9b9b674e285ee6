use crate::category_repo::CategoryRepoError::{CategoryAlreadyExists, CategoryNotFound};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError, NewCategory};
use crate::sqlx_repo::{is_unique_violation, SQLxRepo};
use crate::transaction_repo::UNCATEGORIZED;
use crate::user_repo::UserId;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct CategoryEntry {
    id: i32,
    name: String,
    category_type: String,
}

impl TryFrom<CategoryEntry> for Category {
    type Error = anyhow::Error;

    fn try_from(value: CategoryEntry) -> Result<Self, Self::Error> {
        let category_type = value
            .category_type
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Category {} has an invalid type", value.id))?;
        Ok(Category::new(value.id, value.name, category_type))
    }
}

#[async_trait]
impl CategoryRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_categories(&self, user: UserId) -> Result<Vec<Category>, CategoryRepoError> {
        let entries = query_as::<_, CategoryEntry>(
            "SELECT id, name, type AS category_type FROM categories WHERE user_id = $1 ORDER BY name",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get categories for user {}", user))?;

        let categories = entries
            .into_iter()
            .map(Category::try_from)
            .collect::<Result<Vec<Category>, anyhow::Error>>()?;
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn create_category(
        &self,
        user: UserId,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let name = new_category.normalized_name()?;

        let entry = query_as::<_, CategoryEntry>(
            "INSERT INTO categories(user_id, name, type) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, name) DO NOTHING \
             RETURNING id, name, type AS category_type",
        )
        .bind(user)
        .bind(&name)
        .bind(new_category.category_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to create category {}", name))?
        .ok_or_else(|| CategoryAlreadyExists(name.clone()))?;
        Ok(entry.try_into()?)
    }

    #[instrument(skip(self))]
    async fn update_category(
        &self,
        user: UserId,
        category_id: i32,
        updated_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let name = updated_category.normalized_name()?;

        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let old_name: String = query_scalar::<_, String>(
            "SELECT name FROM categories WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(category_id)
        .bind(user)
        .fetch_optional(&mut *db_transaction)
        .await
        .with_context(|| format!("Unable to get category {}", category_id))?
        .ok_or(CategoryNotFound(category_id))?;

        let entry = query_as::<_, CategoryEntry>(
            "UPDATE categories SET name = $1, type = $2 WHERE id = $3 AND user_id = $4 \
             RETURNING id, name, type AS category_type",
        )
        .bind(&name)
        .bind(updated_category.category_type.as_str())
        .bind(category_id)
        .bind(user)
        .fetch_one(&mut *db_transaction)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CategoryAlreadyExists(name.clone())
            } else {
                CategoryRepoError::Other(
                    anyhow::Error::new(e)
                        .context(format!("Unable to update category {}", category_id)),
                )
            }
        })?;

        if old_name != name {
            query(
                "UPDATE transactions SET category = $1 \
                 WHERE user_id = $2 AND lower(category) = lower($3)",
            )
            .bind(&name)
            .bind(user)
            .bind(&old_name)
            .execute(&mut *db_transaction)
            .await
            .with_context(|| format!("Unable to rename category {} on transactions", old_name))?;
        }

        db_transaction
            .commit()
            .await
            .context("Unable to commit category update")?;

        Ok(entry.try_into()?)
    }

    #[instrument(skip(self))]
    async fn delete_category(
        &self,
        user: UserId,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let mut db_transaction = self
            .pool
            .begin()
            .await
            .context("Unable to start transaction")?;

        let entry = query_as::<_, CategoryEntry>(
            "DELETE FROM categories WHERE id = $1 AND user_id = $2 \
             RETURNING id, name, type AS category_type",
        )
        .bind(category_id)
        .bind(user)
        .fetch_optional(&mut *db_transaction)
        .await
        .with_context(|| format!("Unable to delete category {}", category_id))?
        .ok_or(CategoryNotFound(category_id))?;

        query(
            "UPDATE transactions SET category = $1 \
             WHERE user_id = $2 AND lower(category) = lower($3)",
        )
        .bind(UNCATEGORIZED)
        .bind(user)
        .bind(&entry.name)
        .execute(&mut *db_transaction)
        .await
        .with_context(|| format!("Unable to uncategorize transactions of {}", entry.name))?;

        db_transaction
            .commit()
            .await
            .context("Unable to commit category deletion")?;

        Ok(entry.try_into()?)
    }
}
