//! Routes4Life API service
//!
//! A CRUD backend for user accounts and rated, geolocated places, plus a
//! password recovery flow built on short-lived single-use codes.

pub mod codes;
pub mod error;
pub mod jwt;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
