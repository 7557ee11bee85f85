//! Place repository for database operations
//!
//! Every read is viewer-scoped: the rating attached to a place is the
//! viewing user's own rating row, joined in and defaulted to 0. Multi-step
//! writes (create with initial rating, partial update with rating, image
//! batches) run inside a transaction.

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Category, GeoPoint, NewPlace, PlaceChanges, PlaceImage, PlaceResponse,
};

const PLACE_COLUMNS: &str = "p.id, p.name, p.address, p.city, p.category, p.description, \
                             p.latitude, p.longitude, p.main_image_url";

fn response_from_row(row: &PgRow) -> Result<PlaceResponse> {
    let category: String = row.get("category");
    let category = Category::parse(&category)
        .map_err(|e| anyhow::anyhow!("Corrupt category in database: {}", e))?;

    Ok(PlaceResponse {
        id: row.get("id"),
        name: row.get("name"),
        address: row.get("address"),
        city: row.get("city"),
        category,
        description: row.get("description"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        main_image_url: row.get("main_image_url"),
        images: Vec::new(),
        rating: row.get("rating"),
    })
}

async fn upsert_rating(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    place_id: Uuid,
    user_id: Uuid,
    rating: f64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO place_ratings (place_id, user_id, rating)
        VALUES ($1, $2, $3)
        ON CONFLICT (place_id, user_id) DO UPDATE SET rating = EXCLUDED.rating
        "#,
    )
    .bind(place_id)
    .bind(user_id)
    .bind(rating)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Place repository
#[derive(Clone)]
pub struct PlaceRepository {
    pool: PgPool,
}

impl PlaceRepository {
    /// Create a new place repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a place, plus the creator's rating row when one was submitted
    pub async fn create(&self, owner_id: Uuid, place: &NewPlace) -> Result<Uuid> {
        info!("Creating place '{}' for user {}", place.name, owner_id);

        let mut tx = self.pool.begin().await?;

        let place_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO places (name, address, city, category, description,
                                latitude, longitude, main_image_url, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&place.name)
        .bind(&place.address)
        .bind(&place.city)
        .bind(place.category.as_str())
        .bind(&place.description)
        .bind(place.location.latitude)
        .bind(place.location.longitude)
        .bind(place.main_image_url.as_deref())
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(rating) = place.rating {
            upsert_rating(&mut tx, place_id, owner_id, rating).await?;
        }

        tx.commit().await?;
        Ok(place_id)
    }

    /// Fetch one place as seen by `viewer`
    pub async fn get(&self, id: Uuid, viewer: Uuid) -> Result<Option<PlaceResponse>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {PLACE_COLUMNS}, COALESCE(r.rating, 0) AS rating
            FROM places p
            LEFT JOIN place_ratings r ON r.place_id = p.id AND r.user_id = $2
            WHERE p.id = $1
            "#,
        ))
        .bind(id)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut place = response_from_row(&row)?;
                place.images = self.images_of(&[place.id]).await?.remove(&place.id).unwrap_or_default();
                Ok(Some(place))
            }
            None => Ok(None),
        }
    }

    /// List places as seen by `viewer`, optionally filtered by distance from a center
    pub async fn list(
        &self,
        viewer: Uuid,
        filter: Option<(GeoPoint, f64)>,
    ) -> Result<Vec<PlaceResponse>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PLACE_COLUMNS}, COALESCE(r.rating, 0) AS rating
            FROM places p
            LEFT JOIN place_ratings r ON r.place_id = p.id AND r.user_id = $1
            ORDER BY p.created_at DESC
            "#,
        ))
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows, filter).await
    }

    /// List the places a user owns, rated from their own point of view
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<PlaceResponse>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PLACE_COLUMNS}, COALESCE(r.rating, 0) AS rating
            FROM places p
            LEFT JOIN place_ratings r ON r.place_id = p.id AND r.user_id = $1
            WHERE p.owner_id = $1
            ORDER BY p.created_at DESC
            "#,
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows, None).await
    }

    async fn assemble(
        &self,
        rows: Vec<PgRow>,
        filter: Option<(GeoPoint, f64)>,
    ) -> Result<Vec<PlaceResponse>> {
        let mut places = rows
            .iter()
            .map(response_from_row)
            .collect::<Result<Vec<_>>>()?;

        if let Some((center, distance_km)) = filter {
            places.retain(|place| {
                center.distance_km(&GeoPoint::new(place.latitude, place.longitude)) <= distance_km
            });
        }

        let ids: Vec<Uuid> = places.iter().map(|p| p.id).collect();
        let mut images = self.images_of(&ids).await?;
        for place in &mut places {
            place.images = images.remove(&place.id).unwrap_or_default();
        }

        Ok(places)
    }

    async fn images_of(&self, place_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<PlaceImage>>> {
        if place_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            "SELECT id, place_id, url FROM place_images WHERE place_id = ANY($1) ORDER BY created_at",
        )
        .bind(place_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut images: HashMap<Uuid, Vec<PlaceImage>> = HashMap::new();
        for row in rows {
            let place_id: Uuid = row.get("place_id");
            images.entry(place_id).or_default().push(PlaceImage {
                id: row.get("id"),
                url: row.get("url"),
            });
        }

        Ok(images)
    }

    /// Resolve the owner of a place
    pub async fn owner_of(&self, id: Uuid) -> Result<Option<Uuid>> {
        let owner = sqlx::query_scalar("SELECT owner_id FROM places WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    /// Apply a partial update; a submitted rating goes to the viewer's rating row
    pub async fn update(&self, id: Uuid, changes: &PlaceChanges, viewer: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE places
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                category = COALESCE($5, category),
                description = COALESCE($6, description),
                latitude = COALESCE($7, latitude),
                longitude = COALESCE($8, longitude),
                main_image_url = COALESCE($9, main_image_url),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.address.as_deref())
        .bind(changes.city.as_deref())
        .bind(changes.category.map(|c| c.as_str()))
        .bind(changes.description.as_deref())
        .bind(changes.location.map(|l| l.latitude))
        .bind(changes.location.map(|l| l.longitude))
        .bind(changes.main_image_url.as_deref())
        .execute(&mut *tx)
        .await?;

        if let Some(rating) = changes.rating {
            upsert_rating(&mut tx, id, viewer, rating).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a place; images and ratings cascade
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting place: {}", id);

        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The ids of a place's current secondary images
    pub async fn image_ids(&self, place_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar("SELECT id FROM place_images WHERE place_id = $1")
            .bind(place_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    /// Apply an already-planned image batch atomically
    pub async fn apply_image_batch(
        &self,
        place_id: Uuid,
        delete_ids: &[Uuid],
        upload_urls: &[String],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        if !delete_ids.is_empty() {
            sqlx::query("DELETE FROM place_images WHERE place_id = $1 AND id = ANY($2)")
                .bind(place_id)
                .bind(delete_ids)
                .execute(&mut *tx)
                .await?;
        }

        for url in upload_urls {
            sqlx::query("INSERT INTO place_images (place_id, url) VALUES ($1, $2)")
                .bind(place_id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
