use super::MemRepo;
use crate::category_repo::CategoryRepoError::{CategoryAlreadyExists, CategoryNotFound};
use crate::category_repo::{Category, CategoryRepo, CategoryRepoError, NewCategory};
use crate::transaction_repo::{same_category, UNCATEGORIZED};
use crate::user_repo::UserId;
use async_trait::async_trait;

#[async_trait]
impl CategoryRepo for MemRepo {
    async fn get_categories(&self, user: UserId) -> Result<Vec<Category>, CategoryRepoError> {
        let read_guard = self.read_lock()?;

        let Some(category_ids) = read_guard.user_categories.get(&user) else {
            return Ok(Vec::new());
        };

        let mut categories: Vec<Category> = category_ids
            .iter()
            .filter_map(|id| read_guard.categories.get(id))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(categories)
    }

    async fn create_category(
        &self,
        user: UserId,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let name = new_category.normalized_name()?;

        let mut write_guard = self.write_lock()?;
        let state = &mut *write_guard;

        let user_categories = state.user_categories.entry(user).or_default();
        let exists = user_categories
            .iter()
            .filter_map(|id| state.categories.get(id))
            .any(|c| c.name == name);
        if exists {
            return Err(CategoryAlreadyExists(name));
        }

        let id = state.next_category_id;
        state.next_category_id += 1;

        let category = new_category.to_category(id)?;
        user_categories.insert(id);
        state.categories.insert(id, category.clone());

        Ok(category)
    }

    async fn update_category(
        &self,
        user: UserId,
        category_id: i32,
        updated_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let name = updated_category.normalized_name()?;

        let mut write_guard = self.write_lock()?;
        let state = &mut *write_guard;

        let Some(category_ids) = state.user_categories.get(&user) else {
            return Err(CategoryNotFound(category_id));
        };
        if !category_ids.contains(&category_id) {
            return Err(CategoryNotFound(category_id));
        }
        let name_taken = category_ids
            .iter()
            .filter(|id| **id != category_id)
            .filter_map(|id| state.categories.get(id))
            .any(|c| c.name == name);
        if name_taken {
            return Err(CategoryAlreadyExists(name));
        }

        let category = updated_category.to_category(category_id)?;
        let old_category = state
            .categories
            .insert(category_id, category.clone())
            .ok_or(CategoryNotFound(category_id))?;

        if old_category.name != category.name {
            for transaction in state.user_transactions_mut(user) {
                if same_category(&transaction.category, &old_category.name) {
                    transaction.category = category.name.clone();
                }
            }
        }

        Ok(category)
    }

    async fn delete_category(
        &self,
        user: UserId,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        let removed = write_guard
            .user_categories
            .get_mut(&user)
            .map(|ids| ids.remove(&category_id))
            .unwrap_or(false);
        if !removed {
            return Err(CategoryNotFound(category_id));
        }

        let category = write_guard
            .categories
            .remove(&category_id)
            .ok_or(CategoryNotFound(category_id))?;

        for transaction in write_guard.user_transactions_mut(user) {
            if same_category(&transaction.category, &category.name) {
                transaction.category = UNCATEGORIZED.to_owned();
            }
        }

        Ok(category)
    }
}
