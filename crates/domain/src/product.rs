//! Product use cases.

use std::collections::HashMap;

use common::{
    Category, CategoryId, NewProduct, Pagination, Product, ProductFilter, ProductId,
    ProductUpdate,
};
use store::{Cache, CategoryRepository, ProductRepository, keys};

use crate::cached::CacheAside;
use crate::error::{DomainError, Result};
use crate::patch;

const ENTITY: &str = "product";
const COLLECTION: &str = "products";

/// Service for managing products.
///
/// Products are returned with their category attached.
pub struct ProductService<S, C> {
    store: S,
    cache: CacheAside<C>,
}

impl<S, C> ProductService<S, C>
where
    S: ProductRepository + CategoryRepository,
    C: Cache,
{
    pub fn new(store: S, cache: C) -> Self {
        Self {
            store,
            cache: CacheAside::new(cache),
        }
    }

    /// Creates a product in an existing category.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let category = self.store.get_category_by_id(product.category_id).await?;

        let mut product = self.store.create_product(product).await?;
        product.category = Some(category);

        self.cache
            .write(&keys::entity(ENTITY, product.id), &product)
            .await?;
        self.cache.invalidate(COLLECTION).await?;

        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        let key = keys::entity(ENTITY, id);
        if let Some(product) = self.cache.read(&key).await? {
            return Ok(product);
        }

        let mut product = self.store.get_product_by_id(id).await?;
        product.category = Some(self.store.get_category_by_id(product.category_id).await?);

        self.cache.write(&key, &product).await?;
        Ok(product)
    }

    /// Lists products whose name contains `filter.search` (ignoring case)
    /// and, if given, belong to `filter.category_id`.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: Pagination,
    ) -> Result<Vec<Product>> {
        let params = format!("{}-{}", page.cache_params(), filter.cache_params());
        let key = keys::list(COLLECTION, &params);
        if let Some(products) = self.cache.read(&key).await? {
            return Ok(products);
        }

        let mut products = self.store.list_products(&filter, page).await?;
        let mut categories: HashMap<CategoryId, Category> = HashMap::new();
        for product in &mut products {
            let category = match categories.get(&product.category_id) {
                Some(category) => category.clone(),
                None => {
                    let category = self.store.get_category_by_id(product.category_id).await?;
                    categories.insert(category.id, category.clone());
                    category
                }
            };
            product.category = Some(category);
        }

        self.cache.write(&key, &products).await?;
        Ok(products)
    }

    /// Applies a partial update. A changed category must exist.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product> {
        let mut product = self.store.get_product_by_id(id).await?;

        let mut changed = patch::apply(&mut product.category_id, update.category_id);
        changed |= patch::apply_text(&mut product.name, update.name);
        changed |= patch::apply_text(&mut product.image, update.image);
        changed |= patch::apply(&mut product.stock, update.stock);
        changed |= patch::apply(&mut product.price, update.price);
        if !changed {
            return Err(DomainError::NoUpdatedData);
        }

        let category = self.store.get_category_by_id(product.category_id).await?;
        let mut product = self.store.update_product(&product).await?;
        product.category = Some(category);

        self.cache
            .write(&keys::entity(ENTITY, id), &product)
            .await?;
        self.cache.invalidate(COLLECTION).await?;

        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.store.get_product_by_id(id).await?;

        self.cache.remove(&keys::entity(ENTITY, id)).await?;
        self.cache.invalidate(COLLECTION).await?;

        self.store.delete_product(id).await?;
        Ok(())
    }
}
