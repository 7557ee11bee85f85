//! Place model, geolocation, and related payloads
//!
//! Clients talk in separate `latitude`/`longitude` scalars and a side-channel
//! `rating`; storage wants a combined [`GeoPoint`] and a per-(user, place)
//! rating row. The request types here own that transformation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::validation;

/// Upper bound on secondary images per place
pub const MAX_SECONDARY_IMAGES: usize = 10;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fixed category allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hotel,
    Restaurant,
    Museum,
    Park,
    Entertainment,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hotel => "hotel",
            Category::Restaurant => "restaurant",
            Category::Museum => "museum",
            Category::Park => "park",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }

    /// Parse a client-submitted category against the allow-list
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "hotel" => Ok(Category::Hotel),
            "restaurant" => Ok(Category::Restaurant),
            "museum" => Ok(Category::Museum),
            "park" => Ok(Category::Park),
            "entertainment" => Ok(Category::Entertainment),
            "other" => Ok(Category::Other),
            _ => Err(
                "Category must be one of: hotel, restaurant, museum, park, entertainment, other."
                    .to_string(),
            ),
        }
    }
}

/// Combined geographic point, the storage-facing coordinate shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Split back into the client-facing scalar pair
    pub fn split(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Great-circle distance in kilometers (haversine)
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
    }
}

/// Secondary image attached to a place
#[derive(Debug, Clone, Serialize)]
pub struct PlaceImage {
    pub id: Uuid,
    pub url: String,
}

/// Client-facing place shape
///
/// `rating` is strictly the viewing user's own value, 0 when they never
/// rated the place. It is not an aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub category: Category,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub main_image_url: Option<String>,
    pub images: Vec<PlaceImage>,
    pub rating: f64,
}

/// Storage-facing shape produced by validating a create request
#[derive(Debug, Clone)]
pub struct NewPlace {
    pub name: String,
    pub address: String,
    pub city: String,
    pub category: Category,
    pub description: String,
    pub location: GeoPoint,
    pub main_image_url: Option<String>,
    pub rating: Option<f64>,
}

/// Request for creating a place
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceCreateRequest {
    pub name: String,
    pub address: String,
    pub city: String,
    pub category: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub main_image_url: Option<String>,
    pub rating: Option<f64>,
}

impl PlaceCreateRequest {
    /// Validate and transform into the storage-facing shape
    pub fn validate(&self) -> Result<NewPlace, Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Name is required.".to_string());
        }
        if self.address.trim().is_empty() {
            errors.push("Address is required.".to_string());
        }
        if self.city.trim().is_empty() {
            errors.push("City is required.".to_string());
        }

        let category = match Category::parse(&self.category) {
            Ok(category) => Some(category),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        if let Err(e) = validation::validate_latitude(self.latitude) {
            errors.push(e);
        }
        if let Err(e) = validation::validate_longitude(self.longitude) {
            errors.push(e);
        }
        if let Some(rating) = self.rating {
            if let Err(e) = validation::validate_rating(rating) {
                errors.push(e);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewPlace {
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            category: category.expect("category validated above"),
            description: self.description.clone().unwrap_or_default(),
            location: GeoPoint::new(self.latitude, self.longitude),
            main_image_url: self.main_image_url.clone(),
            rating: self.rating,
        })
    }
}

/// Validated partial update; `None` means "leave unchanged"
#[derive(Debug, Clone, Default)]
pub struct PlaceChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub location: Option<GeoPoint>,
    pub main_image_url: Option<String>,
    pub rating: Option<f64>,
}

/// Request for a partial place update
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceUpdateRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub main_image_url: Option<String>,
    pub rating: Option<f64>,
}

impl PlaceUpdateRequest {
    /// Validate and transform into a [`PlaceChanges`]
    pub fn validate(&self) -> Result<PlaceChanges, Vec<String>> {
        let mut errors = Vec::new();

        let category = match &self.category {
            Some(value) => match Category::parse(value) {
                Ok(category) => Some(category),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
            None => None,
        };

        // coordinates only move as a pair
        let location = match (self.latitude, self.longitude) {
            (None, None) => None,
            (Some(latitude), Some(longitude)) => {
                if let Err(e) = validation::validate_latitude(latitude) {
                    errors.push(e);
                }
                if let Err(e) = validation::validate_longitude(longitude) {
                    errors.push(e);
                }
                Some(GeoPoint::new(latitude, longitude))
            }
            _ => {
                errors.push("Latitude and longitude must be provided together.".to_string());
                None
            }
        };

        if let Some(rating) = self.rating {
            if let Err(e) = validation::validate_rating(rating) {
                errors.push(e);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PlaceChanges {
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            category,
            description: self.description.clone(),
            location,
            main_image_url: self.main_image_url.clone(),
            rating: self.rating,
        })
    }
}

/// Query parameters for place listing
#[derive(Debug, Default, Deserialize)]
pub struct PlacesQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Filter radius in kilometers
    pub distance: Option<f64>,
}

impl PlacesQuery {
    /// Resolve the optional distance filter; all three parameters travel together
    pub fn filter(&self) -> Result<Option<(GeoPoint, f64)>, Vec<String>> {
        match (self.latitude, self.longitude, self.distance) {
            (None, None, None) => Ok(None),
            (Some(latitude), Some(longitude), Some(distance)) => {
                let mut errors = Vec::new();
                if let Err(e) = validation::validate_latitude(latitude) {
                    errors.push(e);
                }
                if let Err(e) = validation::validate_longitude(longitude) {
                    errors.push(e);
                }
                if let Err(e) = validation::validate_distance(distance) {
                    errors.push(e);
                }
                if !errors.is_empty() {
                    return Err(errors);
                }
                Ok(Some((GeoPoint::new(latitude, longitude), distance)))
            }
            _ => Err(vec![
                "Latitude, longitude and distance must be provided together.".to_string(),
            ]),
        }
    }
}

/// Request for the image batch endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceImagesRequest {
    #[serde(default)]
    pub images_to_upload: Vec<String>,
    #[serde(default)]
    pub image_ids_to_delete: Vec<Uuid>,
}

/// Check an image batch against the current image set
///
/// Returns the deduplicated set of ids to delete. Fails when an id does not
/// belong to the place or when the final count would exceed the limit.
pub fn plan_image_batch(
    existing: &[Uuid],
    to_delete: &[Uuid],
    additions: usize,
) -> Result<Vec<Uuid>, String> {
    let existing_set: HashSet<Uuid> = existing.iter().copied().collect();
    let delete_set: HashSet<Uuid> = to_delete.iter().copied().collect();

    if !delete_set.is_subset(&existing_set) {
        return Err("Some of the images to delete do not belong to this place.".to_string());
    }
    if existing.len() - delete_set.len() + additions > MAX_SECONDARY_IMAGES {
        return Err(format!(
            "A place can have at most {} secondary images.",
            MAX_SECONDARY_IMAGES
        ));
    }

    Ok(delete_set.into_iter().collect())
}
