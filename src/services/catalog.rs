//! # Gig Catalog
//!
//! This module provides read and publish access to the gig catalog with multiple
//! implementations. The repository trait lets handlers and the recommender work
//! against either backend.
//!
//! ## Implementations
//!
//! - [`InMemoryCatalog`] - `DashMap`-backed catalog for development and testing
//! - [`PgCatalog`] - PostgreSQL-backed catalog used in production

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use crate::error::AppResult;
use crate::models::{Gig, GigStatus, NewGig};

/// Trait for gig storage backends
///
/// Reads return snapshots: a concurrent publish may or may not be visible,
/// which is all the recommender needs.
#[async_trait]
pub trait GigRepository: Send + Sync {
    /// Returns the gig with `id` if it exists and is currently listed.
    async fn find_listed(&self, id: i64) -> AppResult<Option<Gig>>;

    /// Returns every listed gig, ordered by id.
    async fn listed_gigs(&self) -> AppResult<Vec<Gig>>;

    /// Publishes a new gig and returns it with its assigned id.
    async fn publish(&self, gig: NewGig) -> AppResult<Gig>;
}

/// In-memory catalog
///
/// Ids are assigned from a monotonically increasing counter that always
/// stays above the highest id inserted so far.
#[derive(Debug)]
pub struct InMemoryCatalog {
    gigs: DashMap<i64, Gig>,
    next_id: AtomicI64,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            gigs: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Builds a catalog holding `gigs` as given, whatever their status.
    pub fn from_gigs(gigs: impl IntoIterator<Item = Gig>) -> Self {
        let catalog = Self::new();
        for gig in gigs {
            catalog.insert(gig);
        }
        catalog
    }

    /// Loads a catalog from a JSON array of gigs.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let gigs: Vec<Gig> = serde_json::from_str(content)?;
        Ok(Self::from_gigs(gigs))
    }

    /// Inserts or replaces a gig verbatim.
    pub fn insert(&self, gig: Gig) {
        self.next_id.fetch_max(gig.id + 1, Ordering::SeqCst);
        self.gigs.insert(gig.id, gig);
    }

    pub fn len(&self) -> usize {
        self.gigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gigs.is_empty()
    }
}

#[async_trait]
impl GigRepository for InMemoryCatalog {
    async fn find_listed(&self, id: i64) -> AppResult<Option<Gig>> {
        Ok(self
            .gigs
            .get(&id)
            .map(|entry| entry.value().clone())
            .filter(Gig::is_listed))
    }

    async fn listed_gigs(&self) -> AppResult<Vec<Gig>> {
        let mut gigs: Vec<Gig> = self
            .gigs
            .iter()
            .filter(|entry| entry.value().is_listed())
            .map(|entry| entry.value().clone())
            .collect();
        gigs.sort_by_key(|gig| gig.id);
        Ok(gigs)
    }

    #[instrument(skip_all, fields(seller_id = gig.seller_id))]
    async fn publish(&self, gig: NewGig) -> AppResult<Gig> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let gig = Gig {
            id,
            seller_id: gig.seller_id,
            title: gig.title,
            description: gig.description,
            category: gig.category,
            tags: gig.tags,
            price: gig.price,
            delivery_days: gig.delivery_days,
            status: GigStatus::Published,
            active: true,
            completed_orders: 0,
            average_rating: 0.0,
            seller_verified: gig.seller_verified,
            created_at: OffsetDateTime::now_utc(),
        };
        self.gigs.insert(id, gig.clone());
        debug!(gig_id = id, "Published gig in memory");
        Ok(gig)
    }
}

const GIG_COLUMNS: &str = "id, seller_id, title, description, category, tags, price, \
    delivery_days, status, active, completed_orders, average_rating, seller_verified, created_at";

/// PostgreSQL catalog
pub struct PgCatalog {
    db_pool: PgPool,
}

impl PgCatalog {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Applies the bundled migrations.
    #[instrument(skip_all, err)]
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.db_pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl GigRepository for PgCatalog {
    #[instrument(skip(self), err)]
    async fn find_listed(&self, id: i64) -> AppResult<Option<Gig>> {
        let gig = sqlx::query_as::<_, Gig>(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE id = $1 AND status = 'published' AND active"
        ))
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(gig)
    }

    #[instrument(skip(self), err)]
    async fn listed_gigs(&self) -> AppResult<Vec<Gig>> {
        let gigs = sqlx::query_as::<_, Gig>(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE status = 'published' AND active ORDER BY id"
        ))
        .fetch_all(&self.db_pool)
        .await?;
        debug!(count = gigs.len(), "Loaded listed gigs");
        Ok(gigs)
    }

    #[instrument(skip_all, fields(seller_id = gig.seller_id), err)]
    async fn publish(&self, gig: NewGig) -> AppResult<Gig> {
        let gig = sqlx::query_as::<_, Gig>(&format!(
            "INSERT INTO gigs \
             (seller_id, title, description, category, tags, price, delivery_days, status, seller_verified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'published', $8) \
             RETURNING {GIG_COLUMNS}"
        ))
        .bind(gig.seller_id)
        .bind(gig.title)
        .bind(gig.description)
        .bind(gig.category)
        .bind(gig.tags)
        .bind(gig.price)
        .bind(gig.delivery_days)
        .bind(gig.seller_verified)
        .fetch_one(&self.db_pool)
        .await?;
        info!(gig_id = gig.id, "Published gig");
        Ok(gig)
    }
}
