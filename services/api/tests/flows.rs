//! Database-backed flow tests
//!
//! These tests exercise the repositories against a real PostgreSQL instance
//! reachable through `DATABASE_URL`, with the migrations already applied
//! (run the service once, or `sqlx migrate run`). They use throwaway
//! randomized emails so they can run repeatedly against the same database.

use api::models::{
    place::plan_image_batch, GeoPoint, NewPlace, PlaceChanges, PlaceCreateRequest,
    SettingsUpdateRequest,
};
use api::repositories::{PlaceRepository, UserRepository};
use common::database::{init_pool, DatabaseConfig};
use sqlx::PgPool;
use uuid::Uuid;

async fn pool() -> PgPool {
    let config = DatabaseConfig::from_env().expect("database config");
    init_pool(&config).await.expect("database pool")
}

fn fresh_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4().simple())
}

fn new_place(rating: Option<f64>) -> NewPlace {
    PlaceCreateRequest {
        name: "Niamiha".to_string(),
        address: "Niamiha St 1".to_string(),
        city: "Minsk".to_string(),
        category: "restaurant".to_string(),
        description: Some("Riverside".to_string()),
        latitude: 53.9063,
        longitude: 27.5577,
        main_image_url: None,
        rating,
    }
    .validate()
    .expect("valid place payload")
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance with migrations applied"]
async fn registration_and_password_change() {
    let users = UserRepository::new(pool().await);
    let email = fresh_email();

    let user = users.create(&email, "123456789", "+000000000").await.unwrap();
    assert_eq!(user.email, email);
    assert_ne!(user.password_hash, "123456789");
    assert!(users.verify_password(&user, "123456789").await.unwrap());
    assert!(!users.verify_password(&user, "wrong-password").await.unwrap());
    assert!(users.email_taken(&email).await.unwrap());

    users.set_password(user.id, "234567890").await.unwrap();
    let user = users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(users.verify_password(&user, "234567890").await.unwrap());
    assert!(!users.verify_password(&user, "123456789").await.unwrap());

    assert!(users.delete(user.id).await.unwrap());
    assert!(users.find_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance with migrations applied"]
async fn partial_profile_update_leaves_absent_fields_alone() {
    let users = UserRepository::new(pool().await);
    let user = users
        .create(&fresh_email(), "123456789", "+375291506285")
        .await
        .unwrap();

    let updated = users
        .update_info(
            user.id,
            &SettingsUpdateRequest {
                last_name: Some("Sidorovich".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.last_name, "Sidorovich");
    assert_eq!(updated.phone_number, "+375291506285");
    assert_eq!(updated.email, user.email);

    users.delete(user.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance with migrations applied"]
async fn coordinates_survive_the_database_round_trip() {
    let db = pool().await;
    let users = UserRepository::new(db.clone());
    let places = PlaceRepository::new(db);

    let owner = users.create(&fresh_email(), "123456789", "+000000000").await.unwrap();
    let place_id = places.create(owner.id, &new_place(None)).await.unwrap();

    let place = places.get(place_id, owner.id).await.unwrap().unwrap();
    assert_eq!(place.latitude, 53.9063);
    assert_eq!(place.longitude, 27.5577);

    users.delete(owner.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance with migrations applied"]
async fn rating_is_per_viewer_not_an_aggregate() {
    let db = pool().await;
    let users = UserRepository::new(db.clone());
    let places = PlaceRepository::new(db);

    let owner = users.create(&fresh_email(), "123456789", "+000000000").await.unwrap();
    let other = users.create(&fresh_email(), "123456789", "+000000000").await.unwrap();
    let bystander = users.create(&fresh_email(), "123456789", "+000000000").await.unwrap();

    let place_id = places.create(owner.id, &new_place(Some(5.0))).await.unwrap();

    // the other user files their own, different rating
    places
        .update(
            place_id,
            &PlaceChanges {
                rating: Some(2.0),
                ..Default::default()
            },
            other.id,
        )
        .await
        .unwrap();

    let seen_by_owner = places.get(place_id, owner.id).await.unwrap().unwrap();
    let seen_by_other = places.get(place_id, other.id).await.unwrap().unwrap();
    let seen_by_bystander = places.get(place_id, bystander.id).await.unwrap().unwrap();

    assert_eq!(seen_by_owner.rating, 5.0);
    assert_eq!(seen_by_other.rating, 2.0);
    assert_eq!(seen_by_bystander.rating, 0.0);

    for user in [owner, other, bystander] {
        users.delete(user.id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance with migrations applied"]
async fn image_batches_apply_atomically_and_respect_the_limit() {
    let db = pool().await;
    let users = UserRepository::new(db.clone());
    let places = PlaceRepository::new(db);

    let owner = users.create(&fresh_email(), "123456789", "+000000000").await.unwrap();
    let place_id = places.create(owner.id, &new_place(None)).await.unwrap();

    let initial: Vec<String> = (0..8).map(|i| format!("https://img.example.com/{i}.jpg")).collect();
    places.apply_image_batch(place_id, &[], &initial).await.unwrap();

    let existing = places.image_ids(place_id).await.unwrap();
    assert_eq!(existing.len(), 8);

    // delete 2 and add 4: lands exactly on the limit
    let additions: Vec<String> = (8..12).map(|i| format!("https://img.example.com/{i}.jpg")).collect();
    let plan = plan_image_batch(&existing, &existing[..2], additions.len()).unwrap();
    places.apply_image_batch(place_id, &plan, &additions).await.unwrap();
    assert_eq!(places.image_ids(place_id).await.unwrap().len(), 10);

    // adding 5 to a place already holding 10 must fail before anything applies
    let existing = places.image_ids(place_id).await.unwrap();
    assert!(plan_image_batch(&existing, &[], 5).is_err());
    assert_eq!(places.image_ids(place_id).await.unwrap().len(), 10);

    users.delete(owner.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance with migrations applied"]
async fn distance_filter_narrows_the_listing() {
    let db = pool().await;
    let users = UserRepository::new(db.clone());
    let places = PlaceRepository::new(db);

    let owner = users.create(&fresh_email(), "123456789", "+000000000").await.unwrap();

    let minsk = places.create(owner.id, &new_place(None)).await.unwrap();
    let mut far_away = new_place(None);
    far_away.name = "Sydney Opera House".to_string();
    far_away.location = GeoPoint::new(-33.8568, 151.2153);
    let sydney = places.create(owner.id, &far_away).await.unwrap();

    let nearby = places
        .list(owner.id, Some((GeoPoint::new(53.9, 27.55), 50.0)))
        .await
        .unwrap();

    assert!(nearby.iter().any(|p| p.id == minsk));
    assert!(!nearby.iter().any(|p| p.id == sydney));

    users.delete(owner.id).await.unwrap();
}
