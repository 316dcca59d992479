//! Persistence for users, sessions, recipes and notes.
//!
//! Handlers only see the [`Store`] trait; [`SqliteStore`] is the backend the
//! binary runs with. Every read of user data is scoped by owner: asking for
//! another user's recipe id behaves exactly like asking for one that does not
//! exist.
//!
//! ```rust,ignore
//! use pantry::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::connect("sqlite::memory:", 1).await?;
//! let recipes = store.list_recipes(&user.id).await?;
//! ```

mod seed;
mod sqlite;

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Serialize;
use sqlx::FromRow;

use crate::note::NoteDraft;
use crate::recipe::RecipeDraft;

pub use seed::{seed, SEED_EMAIL, SEED_PASSWORD};
pub use sqlite::SqliteStore;

/// Milliseconds since the Unix epoch; every stored timestamp uses this unit.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[derive(Clone, Debug, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
}

#[derive(Clone, Debug, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, FromRow)]
pub struct StoredIngredient {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

/// A recipe with its ingredients in submission order.
#[derive(Clone, Debug, Serialize)]
pub struct Recipe {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub link_url: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub ingredients: Vec<StoredIngredient>,
}

/// Row of the recipe list page.
#[derive(Clone, Debug, Serialize, FromRow)]
pub struct RecipeSummary {
    pub id: String,
    pub name: String,
    pub link_url: String,
    pub ingredient_count: i64,
}

#[derive(Clone, Debug, Serialize, FromRow)]
pub struct Note {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub body: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Error type for persistence operations.
#[derive(Debug)]
pub enum StoreError {
    /// Driver or connection failure.
    Database(sqlx::Error),
    /// A unique constraint was hit (e.g. an email already registered).
    Conflict(String),
    /// A stored row could not be turned back into a model.
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "database error: {}", e),
            StoreError::Conflict(what) => write!(f, "already exists: {}", what),
            StoreError::Corrupt(msg) => write!(f, "corrupt row: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Corrupt(e.to_string())
            }
            _ => StoreError::Database(e),
        }
    }
}

/// Persistence backend.
///
/// Implementations must be thread-safe; the server shares one instance
/// across all connections.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Start a session with a fresh random token.
    async fn create_session(&self, user_id: &str, expires_at: i64) -> Result<Session, StoreError>;
    /// Owner of `token` if the session exists and has not expired at `now`.
    async fn session_user(&self, token: &str, now: i64) -> Result<Option<String>, StoreError>;
    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;

    /// Insert the recipe and all of its ingredients atomically.
    async fn create_recipe(&self, owner_id: &str, draft: &RecipeDraft) -> Result<Recipe, StoreError>;
    async fn get_recipe(&self, id: &str, owner_id: &str) -> Result<Option<Recipe>, StoreError>;
    /// Most recently updated first.
    async fn list_recipes(&self, owner_id: &str) -> Result<Vec<RecipeSummary>, StoreError>;
    /// Returns whether a recipe was deleted.
    async fn delete_recipe(&self, id: &str, owner_id: &str) -> Result<bool, StoreError>;

    async fn create_note(&self, owner_id: &str, draft: &NoteDraft) -> Result<Note, StoreError>;
    async fn get_note(&self, id: &str, owner_id: &str) -> Result<Option<Note>, StoreError>;
    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, StoreError>;
    async fn delete_note(&self, id: &str, owner_id: &str) -> Result<bool, StoreError>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), StoreError>;
}
