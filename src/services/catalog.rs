//! Catalog browsing and admin product management.

use serde::Serialize;
use sqlx::SqlitePool;

use super::session::Session;
use crate::domain::aggregates::{Product, ProductDraft, ProductId};
use crate::domain::value_objects::{Category, Money};
use crate::store::{ProductQuery, ProductRepository};
use crate::{Result, StorefrontError};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;
pub const DEMO_CATALOG_SIZE: u32 = 500;

/// Raw search input as it arrives from a caller.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub data: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub name: &'static str,
    pub code: i64,
}

/// Fields for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub unit_price: i64,
    pub stock: i64,
}

impl ProductInput {
    fn into_draft(self) -> Result<ProductDraft> {
        Ok(ProductDraft::new(self.name, &self.category, self.unit_price, self.stock)?)
    }
}

#[derive(Clone)]
pub struct CatalogService {
    pool: SqlitePool,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> ProductRepository<'_> { ProductRepository::new(&self.pool) }

    #[tracing::instrument(skip(self, session), fields(user_id = session.user_id))]
    pub async fn add_product(&self, session: &Session, input: ProductInput) -> Result<Product> {
        session.require_admin()?;
        let product = self.repo().insert(input.into_draft()?).await?;
        tracing::info!(product_id = product.id(), "product added");
        Ok(product)
    }

    #[tracing::instrument(skip(self, session), fields(user_id = session.user_id))]
    pub async fn update_product(&self, session: &Session, id: ProductId, input: ProductInput) -> Result<Product> {
        session.require_admin()?;
        let product = self.repo().update(id, input.into_draft()?).await?.ok_or_else(|| StorefrontError::not_found("product", id))?;
        tracing::info!(product_id = id, "product updated");
        Ok(product)
    }

    #[tracing::instrument(skip(self, session), fields(user_id = session.user_id))]
    pub async fn remove_product(&self, session: &Session, id: ProductId) -> Result<()> {
        session.require_admin()?;
        if !self.repo().delete(id).await? {
            return Err(StorefrontError::not_found("product", id));
        }
        tracing::info!(product_id = id, "product removed");
        Ok(())
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.repo().get(id).await?.ok_or_else(|| StorefrontError::not_found("product", id))
    }

    /// Case-insensitive name search with optional category and inclusive price bounds.
    ///
    /// Without `page`/`per_page` every match is returned.
    pub async fn search(&self, req: SearchRequest) -> Result<SearchResults> {
        let category = req.category.as_deref().filter(|c| !c.trim().is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::parse::<Category>)
            .transpose()?;
        let min_price = req.min_price.map(bound("min_price")).transpose()?;
        let max_price = req.max_price.map(bound("max_price")).transpose()?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(StorefrontError::validation("min_price must not exceed max_price"));
            }
        }

        let paginate = req.page.is_some() || req.per_page.is_some();
        let page = req.page.unwrap_or(1).max(1);
        let per_page = req.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let query = ProductQuery {
            text: req.query.unwrap_or_default().trim().to_string(),
            category,
            min_price,
            max_price,
            window: paginate.then(|| (per_page, (page - 1).saturating_mul(per_page))),
        };

        let repo = self.repo();
        let data = repo.search(&query).await?;
        let total = repo.count_matching(&query).await?;
        Ok(SearchResults { data, total, page, per_page: paginate.then_some(per_page) })
    }

    pub fn categories(&self) -> Vec<CategoryInfo> {
        Category::ALL.iter().map(|c| CategoryInfo { name: c.as_str(), code: c.code() }).collect()
    }

    pub async fn seed_demo_catalog(&self) -> Result<u32> {
        self.repo().seed_demo(DEMO_CATALOG_SIZE).await
    }
}

fn bound(name: &'static str) -> impl Fn(i64) -> Result<Money> {
    move |v| if v < 0 { Err(StorefrontError::validation(format!("{name} must not be negative"))) } else { Ok(Money::from_minor(v)) }
}
