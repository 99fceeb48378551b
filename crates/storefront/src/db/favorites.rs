//! Favorite repository for database operations.
//!
//! Queries are built at runtime (`query_as` + `FromRow`) so the crate builds
//! without a live database or an offline query cache.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use trend_core::ProductId;

use super::RepositoryError;
use crate::shopify::types::{Image, Money, PriceRange, Product};

/// A saved product.
///
/// Holds just enough to render a product card without a network round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub product_id: ProductId,
    pub title: String,
    pub image_url: Option<String>,
    pub min_price: String,
    pub max_price: String,
    pub currency_code: String,
    pub added_at: DateTime<Utc>,
}

impl Favorite {
    /// Snapshot a product as a favorite added at `added_at`.
    #[must_use]
    pub fn from_product(product: &Product, added_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            image_url: product.featured_image_url().map(String::from),
            min_price: product.price_range.min_variant_price.amount.clone(),
            max_price: product.price_range.max_variant_price.amount.clone(),
            currency_code: product.price_range.min_variant_price.currency_code.clone(),
            added_at,
        }
    }

    /// Display-only product: empty description, no variants, at most one image.
    #[must_use]
    pub fn to_product(&self) -> Product {
        Product {
            id: self.product_id.clone(),
            title: self.title.clone(),
            description: String::new(),
            images: self
                .image_url
                .iter()
                .map(|url| Image {
                    url: url.clone(),
                    alt_text: None,
                })
                .collect(),
            price_range: PriceRange {
                min_variant_price: Money::new(&self.min_price, &self.currency_code),
                max_variant_price: Money::new(&self.max_price, &self.currency_code),
            },
            variants: Vec::new(),
        }
    }
}

#[derive(FromRow)]
struct FavoriteRow {
    product_id: ProductId,
    title: String,
    image_url: Option<String>,
    min_price: String,
    max_price: String,
    currency_code: String,
    added_at: i64,
}

impl TryFrom<FavoriteRow> for Favorite {
    type Error = RepositoryError;

    fn try_from(row: FavoriteRow) -> Result<Self, Self::Error> {
        let added_at = DateTime::from_timestamp_millis(row.added_at).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "invalid added_at {} for favorite {}",
                row.added_at, row.product_id
            ))
        })?;

        Ok(Self {
            product_id: row.product_id,
            title: row.title,
            image_url: row.image_url,
            min_price: row.min_price,
            max_price: row.max_price,
            currency_code: row.currency_code,
            added_at,
        })
    }
}

/// Repository for favorite database operations.
pub struct FavoriteRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All favorites, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored timestamp is invalid.
    pub async fn get_all(&self) -> Result<Vec<Favorite>, RepositoryError> {
        let rows: Vec<FavoriteRow> = sqlx::query_as(
            r"
            SELECT product_id, title, image_url, min_price, max_price, currency_code, added_at
            FROM favorites
            ORDER BY added_at DESC, rowid DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Favorite::try_from).collect()
    }

    /// IDs of all favorites.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_all_ids(&self) -> Result<HashSet<ProductId>, RepositoryError> {
        let ids: Vec<ProductId> = sqlx::query_scalar("SELECT product_id FROM favorites")
            .fetch_all(self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Whether a product is saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_favorite(&self, product_id: &ProductId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM favorites WHERE product_id = ?)")
                .bind(product_id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Insert or replace a favorite keyed by product ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, favorite: &Favorite) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO favorites
                (product_id, title, image_url, min_price, max_price, currency_code, added_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (product_id) DO UPDATE SET
                title = excluded.title,
                image_url = excluded.image_url,
                min_price = excluded.min_price,
                max_price = excluded.max_price,
                currency_code = excluded.currency_code,
                added_at = excluded.added_at
            ",
        )
        .bind(&favorite.product_id)
        .bind(&favorite.title)
        .bind(&favorite.image_url)
        .bind(&favorite.min_price)
        .bind(&favorite.max_price)
        .bind(&favorite.currency_code)
        .bind(favorite.added_at.timestamp_millis())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete a favorite. Deleting a missing favorite is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, product_id: &ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM favorites WHERE product_id = ?")
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::db::in_memory_pool;

    fn favorite(id: &str, millis: i64) -> Favorite {
        Favorite {
            product_id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: Some(format!("https://cdn.example.com/{id}.jpg")),
            min_price: "19.99".to_string(),
            max_price: "29.99".to_string(),
            currency_code: "USD".to_string(),
            added_at: Utc.timestamp_millis_opt(millis).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_get_all_orders_newest_first() {
        let pool = in_memory_pool().await.unwrap();
        let repo = FavoriteRepository::new(&pool);

        repo.upsert(&favorite("a", 1_000)).await.unwrap();
        repo.upsert(&favorite("b", 3_000)).await.unwrap();
        repo.upsert(&favorite("c", 2_000)).await.unwrap();

        let ids: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.product_id.into_inner())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let pool = in_memory_pool().await.unwrap();
        let repo = FavoriteRepository::new(&pool);

        repo.upsert(&favorite("a", 1_000)).await.unwrap();
        let mut updated = favorite("a", 5_000);
        updated.title = "Renamed".to_string();
        repo.upsert(&updated).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all, vec![updated]);
    }

    #[tokio::test]
    async fn test_membership_and_delete() {
        let pool = in_memory_pool().await.unwrap();
        let repo = FavoriteRepository::new(&pool);
        let id = ProductId::new("a");

        assert!(!repo.is_favorite(&id).await.unwrap());
        repo.upsert(&favorite("a", 1_000)).await.unwrap();
        assert!(repo.is_favorite(&id).await.unwrap());
        assert!(repo.get_all_ids().await.unwrap().contains(&id));

        repo.delete(&id).await.unwrap();
        repo.delete(&id).await.unwrap();
        assert!(!repo.is_favorite(&id).await.unwrap());
    }

    #[test]
    fn test_to_product_is_display_only() {
        let product = favorite("a", 1_000).to_product();

        assert!(product.description.is_empty());
        assert!(product.variants.is_empty());
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.price_range.min_variant_price.formatted(), "$19.99");
        assert_eq!(product.price_range.max_variant_price.formatted(), "$29.99");
    }
}
