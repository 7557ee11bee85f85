//! Application state shared across handlers

use crate::{
    codes::CodeStore,
    jwt::JwtService,
    mailer::Mailer,
    repositories::{PlaceRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub places: PlaceRepository,
    pub jwt: JwtService,
    pub codes: CodeStore,
    pub mailer: Mailer,
}
