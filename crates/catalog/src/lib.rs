//! Catalog domain module: categories and the products filed under them.
//!
//! These are flat attribute records. The only rules here are field validation;
//! referential checks (category exists, product still stocked) live in the
//! service layer where the stores are reachable.

pub mod category;
pub mod product;

pub use category::{Category, CategoryDraft};
pub use product::{Price, Product, ProductDraft};
