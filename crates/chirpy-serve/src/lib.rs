//! Chirpy Serve - HTTP API for short text posts ("chirps").
//!
//! Users post chirps of up to 140 bytes. Bodies are checked and cleaned by
//! [`chirpy_core::validate_chirp`] before they are stored, so banned words
//! never reach the database.
//!
//! # Architecture
//!
//! - **AppState**: Shared application state (database, hit counter, configuration)
//! - **Database**: SQLite storage for users and chirps
//! - **HitCounter**: Atomic count of static file requests, reset from the admin API
//! - **Routes**: Endpoint handlers grouped by domain

pub mod db;
mod error;
mod hits;
mod routes;
mod state;

pub use self::db::{Chirp, Database, DbError, User};
pub use self::error::ApiError;
pub use self::hits::{HitCounter, count_hits};
pub use self::routes::{
    CreateChirpRequest, CreateUserRequest, ValidateChirpRequest, ValidateChirpResponse, router,
};
pub use self::state::{AppState, Config, DEV_PLATFORM};
