//! Repositories for database operations

pub mod place;
pub mod user;

pub use place::PlaceRepository;
pub use user::UserRepository;
