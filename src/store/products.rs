//! Product repository: admin CRUD, search and demo seeding.

use rand::Rng;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::{corrupt, count_from_db, WriteTx};
use crate::domain::aggregates::{Product, ProductDraft, ProductId};
use crate::domain::value_objects::{Category, Money};
use crate::{Result, StorefrontError};

const PRODUCT_COLUMNS: &str = "id, name, category, category_code, unit_price, stock";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: i64,
    name: String,
    category: String,
    category_code: i64,
    unit_price: i64,
    stock: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = StorefrontError;

    fn try_from(r: ProductRow) -> Result<Self> {
        let category = r.category.parse::<Category>().map_err(|e| corrupt("products.category", e))?;
        let coded = Category::from_code(r.category_code).map_err(|e| corrupt("products.category_code", e))?;
        if coded != category {
            return Err(corrupt("products.category_code", format!("{coded} does not match {category}")));
        }
        let draft = ProductDraft {
            name: r.name,
            category,
            unit_price: Money::price(r.unit_price).map_err(|e| corrupt("products.unit_price", e))?,
            stock: count_from_db("products.stock", r.stock)?,
        };
        Ok(Product::from_draft(r.id, draft))
    }
}

/// Search filters. Name matching is a case-insensitive substring test; price bounds are inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub text: String,
    pub category: Option<Category>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    /// `(limit, offset)`; `None` returns every match.
    pub window: Option<(u32, u32)>,
}

impl ProductQuery {
    fn push_filters(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE instr(lower(name), lower(").push_bind(self.text.clone()).push(")) > 0");
        if let Some(category) = self.category {
            qb.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(min) = self.min_price {
            qb.push(" AND unit_price >= ").push_bind(min.minor());
        }
        if let Some(max) = self.max_price {
            qb.push(" AND unit_price <= ").push_bind(max.minor());
        }
    }
}

pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, draft: ProductDraft) -> Result<Product> {
        let mut conn = self.pool.acquire().await?;
        let id = insert_product(&mut conn, &draft).await?;
        Ok(Product::from_draft(id, draft))
    }

    /// Replaces every editable field. Returns `None` when the product does not exist.
    pub async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>> {
        let result = sqlx::query(
            "UPDATE products SET name = ?, category = ?, category_code = ?, unit_price = ?, stock = ? WHERE id = ?",
        )
        .bind(&draft.name)
        .bind(draft.category.as_str())
        .bind(draft.category.code())
        .bind(draft.unit_price.minor())
        .bind(i64::from(draft.stock))
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok((result.rows_affected() > 0).then(|| Product::from_draft(id, draft)))
    }

    pub async fn delete(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?").bind(id).execute(self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        sqlx::query_as::<_, ProductRow>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    pub async fn search(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        query.push_filters(&mut qb);
        qb.push(" ORDER BY id");
        if let Some((limit, offset)) = query.window {
            qb.push(" LIMIT ").push_bind(i64::from(limit)).push(" OFFSET ").push_bind(i64::from(offset));
        }
        qb.build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    /// Number of matches ignoring the pagination window.
    pub async fn count_matching(&self, query: &ProductQuery) -> Result<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
        query.push_filters(&mut qb);
        Ok(qb.build_query_scalar::<i64>().fetch_one(self.pool).await?)
    }

    /// Fills an empty catalog with `count` random products. Returns how many rows were written.
    pub async fn seed_demo(&self, count: u32) -> Result<u32> {
        let drafts: Vec<ProductDraft> = {
            let mut rng = rand::thread_rng();
            (1..=count)
                .map(|i| {
                    let category = Category::ALL[rng.gen_range(0..Category::ALL.len())];
                    ProductDraft {
                        name: format!("Product {i}"),
                        category,
                        unit_price: Money::from_major(rng.gen_range(500..=100_000)),
                        stock: rng.gen_range(5..=10),
                    }
                })
                .collect()
        };

        let mut tx = WriteTx::begin(self.pool).await?;
        let result = seed_if_empty(&mut tx, &drafts).await;
        let written = tx.finish(result).await?;
        if written > 0 {
            tracing::info!(count = written, "seeded demo catalog");
        }
        Ok(written)
    }
}

/// `execute` steps the statement to completion, so in autocommit mode the row is committed by the
/// time the id comes back.
async fn insert_product(conn: &mut SqliteConnection, draft: &ProductDraft) -> Result<ProductId> {
    let result = sqlx::query("INSERT INTO products (name, category, category_code, unit_price, stock) VALUES (?, ?, ?, ?, ?)")
        .bind(&draft.name)
        .bind(draft.category.as_str())
        .bind(draft.category.code())
        .bind(draft.unit_price.minor())
        .bind(i64::from(draft.stock))
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_rowid())
}

/// The emptiness check runs under the write lock, so two processes starting together seed once.
async fn seed_if_empty(conn: &mut SqliteConnection, drafts: &[ProductDraft]) -> Result<u32> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(&mut *conn).await?;
    if existing > 0 {
        return Ok(0);
    }
    for draft in drafts {
        insert_product(&mut *conn, draft).await?;
    }
    Ok(u32::try_from(drafts.len()).unwrap_or(u32::MAX))
}
