//! Category use cases.

use common::{Category, CategoryId, CategoryUpdate, NewCategory, Pagination};
use store::{Cache, CategoryRepository, keys};

use crate::cached::CacheAside;
use crate::error::{DomainError, Result};
use crate::patch;

const ENTITY: &str = "category";
const COLLECTION: &str = "categories";

/// Service for managing product categories.
pub struct CategoryService<R, C> {
    repo: R,
    cache: CacheAside<C>,
}

impl<R: CategoryRepository, C: Cache> CategoryService<R, C> {
    pub fn new(repo: R, cache: C) -> Self {
        Self {
            repo,
            cache: CacheAside::new(cache),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let category = self.repo.create_category(category).await?;

        self.cache
            .write(&keys::entity(ENTITY, category.id), &category)
            .await?;
        self.cache.invalidate(COLLECTION).await?;

        Ok(category)
    }

    /// Gets a category, reading through the cache.
    #[tracing::instrument(skip(self))]
    pub async fn get_category(&self, id: CategoryId) -> Result<Category> {
        let key = keys::entity(ENTITY, id);
        if let Some(category) = self.cache.read(&key).await? {
            return Ok(category);
        }

        let category = self.repo.get_category_by_id(id).await?;
        self.cache.write(&key, &category).await?;
        Ok(category)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_categories(&self, page: Pagination) -> Result<Vec<Category>> {
        let key = keys::list(COLLECTION, &page.cache_params());
        if let Some(categories) = self.cache.read(&key).await? {
            return Ok(categories);
        }

        let categories = self.repo.list_categories(page).await?;
        self.cache.write(&key, &categories).await?;
        Ok(categories)
    }

    /// Renames a category.
    ///
    /// Fails with [`DomainError::NoUpdatedData`] without writing if the new
    /// name is missing, empty or unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Category> {
        let mut category = self.repo.get_category_by_id(id).await?;
        if !patch::apply_text(&mut category.name, update.name) {
            return Err(DomainError::NoUpdatedData);
        }

        let category = self.repo.update_category(&category).await?;

        self.cache
            .write(&keys::entity(ENTITY, id), &category)
            .await?;
        self.cache.invalidate(COLLECTION).await?;

        Ok(category)
    }

    /// Deletes a category. Products referencing it are left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        self.repo.get_category_by_id(id).await?;

        self.cache.remove(&keys::entity(ENTITY, id)).await?;
        self.cache.invalidate(COLLECTION).await?;

        self.repo.delete_category(id).await?;
        Ok(())
    }
}
