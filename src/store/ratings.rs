//! Product ratings repository. Ratings are append-only.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use super::corrupt;
use crate::domain::aggregates::{ProductId, UserId};
use crate::domain::value_objects::Rating;
use crate::{Result, StorefrontError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub username: String,
    pub rating: Rating,
    pub review: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub count: i64,
    pub average: Option<f64>,
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    username: String,
    rating: i64,
    review: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = StorefrontError;

    fn try_from(r: ReviewRow) -> Result<Self> {
        let rating = u8::try_from(r.rating)
            .ok()
            .and_then(|v| Rating::new(v).ok())
            .ok_or_else(|| corrupt("product_ratings.rating", r.rating))?;
        Ok(Review { username: r.username, rating, review: r.review, created_at: r.created_at })
    }
}

pub struct RatingRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RatingRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user_id: UserId, product_id: ProductId, rating: Rating, review: &str) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        sqlx::query("INSERT INTO product_ratings (user_id, product_id, rating, review, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(user_id)
            .bind(product_id)
            .bind(i64::from(rating.value()))
            .bind(review)
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(now)
    }

    /// Reviews for a product, newest first.
    pub async fn for_product(&self, product_id: ProductId) -> Result<Vec<Review>> {
        sqlx::query_as::<_, ReviewRow>(
            "SELECT u.username, r.rating, r.review, r.created_at
             FROM product_ratings r
             JOIN users u ON r.user_id = u.id
             WHERE r.product_id = ?
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Review::try_from)
        .collect()
    }

    pub async fn summary(&self, product_id: ProductId) -> Result<RatingSummary> {
        let (count, average): (i64, Option<f64>) =
            sqlx::query_as("SELECT COUNT(*), AVG(rating) FROM product_ratings WHERE product_id = ?")
                .bind(product_id)
                .fetch_one(self.pool)
                .await?;
        Ok(RatingSummary { count, average })
    }
}
