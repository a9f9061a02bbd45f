use crate::Amount;
use crate::model::{Count, Product, ProductId};

use super::CatalogError;

/// Products in insertion order, with sequential ids starting at 1.
#[derive(Debug)]
pub struct Catalog {
    products: Vec<Product>,
    next_id: ProductId,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
            next_id: 1,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> + '_ {
        self.products.iter()
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    /// Add a product and return its id. A zero initial quantity is allowed.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        price: Amount,
        quantity: Count,
    ) -> Result<ProductId, CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if price.is_zero() {
            return Err(CatalogError::ZeroPrice);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.products.push(Product {
            id,
            name,
            price,
            quantity,
        });
        Ok(id)
    }

    pub fn restock(&mut self, id: ProductId, amount: Count) -> Result<(), CatalogError> {
        if amount == 0 {
            return Err(CatalogError::ZeroQuantity);
        }
        let product = self.get_mut(id).ok_or(CatalogError::ProductNotFound(id))?;
        product.quantity = product.quantity.saturating_add(amount);
        Ok(())
    }

    pub fn reprice(&mut self, id: ProductId, price: Amount) -> Result<(), CatalogError> {
        if price.is_zero() {
            return Err(CatalogError::ZeroPrice);
        }
        let product = self.get_mut(id).ok_or(CatalogError::ProductNotFound(id))?;
        product.price = price;
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
