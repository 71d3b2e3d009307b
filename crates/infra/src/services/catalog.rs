//! Category and product services.
//!
//! Plain field-level create/read/update/delete with referential checks; no
//! derived state lives here.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, instrument};

use cragsupply_catalog::{Category, CategoryDraft, Product, ProductDraft};
use cragsupply_core::{CategoryId, Entity, ProductId};
use cragsupply_inventory::InventoryLine;

use crate::lock::LockError;
use crate::store::{CategoryStore, InventoryStore, ProductStore};

use super::{ServiceError, ServiceResult};

pub struct CategoryService {
    categories: Arc<dyn CategoryStore>,
    products: Arc<dyn ProductStore>,
    names: Mutex<()>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryStore>, products: Arc<dyn ProductStore>) -> Self {
        Self {
            categories,
            products,
            names: Mutex::new(()),
        }
    }

    pub fn find(&self, id: CategoryId) -> ServiceResult<Option<Category>> {
        Ok(self.categories.find(id)?)
    }

    pub fn find_by_name(&self, name: &str) -> ServiceResult<Option<Category>> {
        Ok(self.categories.find_by_name(name.trim())?)
    }

    pub fn list(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list()?)
    }

    #[instrument(skip(self))]
    pub fn create(&self, draft: CategoryDraft) -> ServiceResult<Category> {
        let _names = lock_names(&self.names)?;
        let category = Category::new(self.categories.next_id()?, draft)?;
        self.ensure_name_free(&category, None)?;

        let saved = self.categories.save(category)?;
        info!(category_id = %saved.id(), name = saved.name(), "category created");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub fn update(&self, id: CategoryId, draft: CategoryDraft) -> ServiceResult<Category> {
        let _names = lock_names(&self.names)?;
        if self.categories.find(id)?.is_none() {
            return Err(ServiceError::NotFound(format!("category {id}")));
        }
        let category = Category::new(id, draft)?;
        self.ensure_name_free(&category, Some(id))?;
        Ok(self.categories.save(category)?)
    }

    /// Remove a category no product belongs to. Missing ids succeed.
    #[instrument(skip(self))]
    pub fn delete(&self, id: CategoryId) -> ServiceResult<()> {
        let products = self.products.list_by_category(id)?;
        if !products.is_empty() {
            return Err(ServiceError::Conflict(format!(
                "category {id} still has {} product(s)",
                products.len()
            )));
        }
        if self.categories.delete(id)? {
            info!(category_id = %id, "category deleted");
        }
        Ok(())
    }

    fn ensure_name_free(&self, category: &Category, except: Option<CategoryId>) -> ServiceResult<()> {
        match self.categories.find_by_name(category.name())? {
            Some(other) if Some(other.id()) != except => Err(ServiceError::NameConflict(format!(
                "category with name '{}' already exists",
                category.name()
            ))),
            _ => Ok(()),
        }
    }
}

/// A product together with every inventory line that stocks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetails {
    pub product: Product,
    pub lines: Vec<InventoryLine>,
}

pub struct ProductService {
    products: Arc<dyn ProductStore>,
    categories: Arc<dyn CategoryStore>,
    lines: Arc<dyn InventoryStore>,
}

impl ProductService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        categories: Arc<dyn CategoryStore>,
        lines: Arc<dyn InventoryStore>,
    ) -> Self {
        Self {
            products,
            categories,
            lines,
        }
    }

    pub fn find(&self, id: ProductId) -> ServiceResult<Option<Product>> {
        Ok(self.products.find(id)?)
    }

    pub fn list(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.products.list()?)
    }

    pub fn list_by_category(&self, category_id: CategoryId) -> ServiceResult<Vec<Product>> {
        Ok(self.products.list_by_category(category_id)?)
    }

    pub fn find_by_brand_and_name(&self, brand: &str, name: &str) -> ServiceResult<Option<Product>> {
        Ok(self
            .products
            .find_by_brand_and_name(brand.trim(), name.trim())?)
    }

    pub fn find_detailed(&self, id: ProductId) -> ServiceResult<Option<ProductDetails>> {
        match self.products.find(id)? {
            Some(product) => Ok(Some(self.details(product)?)),
            None => Ok(None),
        }
    }

    /// Detailed views of every product, or only those in `category_id`.
    pub fn list_detailed(&self, category_id: Option<CategoryId>) -> ServiceResult<Vec<ProductDetails>> {
        let products = match category_id {
            Some(category_id) => self.products.list_by_category(category_id)?,
            None => self.products.list()?,
        };
        products
            .into_iter()
            .map(|product| self.details(product))
            .collect()
    }

    fn details(&self, product: Product) -> ServiceResult<ProductDetails> {
        let lines = self.lines.list_by_product(product.id())?;
        Ok(ProductDetails { product, lines })
    }

    #[instrument(skip(self))]
    pub fn create(&self, draft: ProductDraft) -> ServiceResult<Product> {
        self.require_category(draft.category_id)?;
        let product = Product::new(self.products.next_id()?, draft)?;
        let saved = self.products.save(product)?;
        info!(product_id = %saved.id(), name = saved.name(), "product created");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub fn update(&self, id: ProductId, draft: ProductDraft) -> ServiceResult<Product> {
        if self.products.find(id)?.is_none() {
            return Err(ServiceError::NotFound(format!("product {id}")));
        }
        self.require_category(draft.category_id)?;
        Ok(self.products.save(Product::new(id, draft)?)?)
    }

    /// Remove a product that no inventory line refers to. Missing ids succeed.
    #[instrument(skip(self))]
    pub fn delete(&self, id: ProductId) -> ServiceResult<()> {
        let stocked = self.lines.list_by_product(id)?;
        if !stocked.is_empty() {
            return Err(ServiceError::Conflict(format!(
                "product {id} is still stocked on {} inventory line(s)",
                stocked.len()
            )));
        }
        if self.products.delete(id)? {
            info!(product_id = %id, "product deleted");
        }
        Ok(())
    }

    fn require_category(&self, id: CategoryId) -> ServiceResult<()> {
        match self.categories.find(id)? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(format!("category {id}"))),
        }
    }
}

fn lock_names(names: &Mutex<()>) -> ServiceResult<std::sync::MutexGuard<'_, ()>> {
    names
        .lock()
        .map_err(|e| LockError::Poisoned(e.to_string()).into())
}
