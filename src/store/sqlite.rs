//! SQLite backend.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use super::{
    now_millis, Note, Recipe, RecipeSummary, Session, Store, StoreError, StoredIngredient, User,
};
use crate::note::NoteDraft;
use crate::recipe::RecipeDraft;

/// Idempotent schema, applied on every connect.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        expires_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS recipes (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        link_url TEXT NOT NULL DEFAULT '',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS ingredients (
        id TEXT PRIMARY KEY,
        recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        quantity REAL NOT NULL,
        unit TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS notes (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_recipes_owner ON recipes(owner_id, updated_at)",
    "CREATE INDEX IF NOT EXISTS idx_ingredients_recipe ON ingredients(recipe_id, position)",
    "CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes(owner_id, updated_at)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
];

#[derive(FromRow)]
struct RecipeRow {
    id: String,
    owner_id: String,
    name: String,
    link_url: String,
    created_at: i64,
    updated_at: i64,
}

impl RecipeRow {
    fn with_ingredients(self, ingredients: Vec<StoredIngredient>) -> Recipe {
        Recipe {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            link_url: self.link_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            ingredients,
        }
    }
}

/// [`Store`] over a sqlx SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and apply the schema.
    ///
    /// In-memory databases are pinned to a single long-lived connection;
    /// a second connection would see a different, empty database.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!(statements = SCHEMA.len(), "schema applied");
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub(super) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl Store for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = User {
            id: new_id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now_millis(),
        };

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_session(&self, user_id: &str, expires_at: i64) -> Result<Session, StoreError> {
        let session = Session {
            token: format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            expires_at,
        };

        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&session.token)
            .bind(&session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;

        Ok(session)
    }

    async fn session_user(&self, token: &str, now: i64) -> Result<Option<String>, StoreError> {
        let user_id = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM sessions WHERE token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_recipe(&self, owner_id: &str, draft: &RecipeDraft) -> Result<Recipe, StoreError> {
        let now = now_millis();
        let row = RecipeRow {
            id: new_id(),
            owner_id: owner_id.to_string(),
            name: draft.name.clone(),
            link_url: draft.link_url.clone(),
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO recipes (id, owner_id, name, link_url, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.owner_id)
        .bind(&row.name)
        .bind(&row.link_url)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut ingredients = Vec::with_capacity(draft.ingredients.len());
        for (position, ingredient) in draft.ingredients.iter().enumerate() {
            let stored = StoredIngredient {
                id: new_id(),
                name: ingredient.name.clone(),
                quantity: ingredient.quantity,
                unit: ingredient.unit.clone(),
            };

            sqlx::query(
                "INSERT INTO ingredients (id, recipe_id, position, name, quantity, unit)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&stored.id)
            .bind(&row.id)
            .bind(position as i64)
            .bind(&stored.name)
            .bind(stored.quantity)
            .bind(&stored.unit)
            .execute(&mut *tx)
            .await?;

            ingredients.push(stored);
        }

        tx.commit().await?;

        Ok(row.with_ingredients(ingredients))
    }

    async fn get_recipe(&self, id: &str, owner_id: &str) -> Result<Option<Recipe>, StoreError> {
        let row = sqlx::query_as::<_, RecipeRow>(
            "SELECT id, owner_id, name, link_url, created_at, updated_at
             FROM recipes WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let ingredients = sqlx::query_as::<_, StoredIngredient>(
            "SELECT id, name, quantity, unit FROM ingredients
             WHERE recipe_id = ? ORDER BY position",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.with_ingredients(ingredients)))
    }

    async fn list_recipes(&self, owner_id: &str) -> Result<Vec<RecipeSummary>, StoreError> {
        let recipes = sqlx::query_as::<_, RecipeSummary>(
            "SELECT r.id, r.name, r.link_url, COUNT(i.id) AS ingredient_count
             FROM recipes r LEFT JOIN ingredients i ON i.recipe_id = r.id
             WHERE r.owner_id = ?
             GROUP BY r.id
             ORDER BY r.updated_at DESC, r.rowid DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(recipes)
    }

    async fn delete_recipe(&self, id: &str, owner_id: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM recipes WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // Cascades already cover this when foreign keys are on
        if deleted > 0 {
            sqlx::query("DELETE FROM ingredients WHERE recipe_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn create_note(&self, owner_id: &str, draft: &NoteDraft) -> Result<Note, StoreError> {
        let now = now_millis();
        let note = Note {
            id: new_id(),
            owner_id: owner_id.to_string(),
            title: draft.title.clone(),
            body: draft.body.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO notes (id, owner_id, title, body, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&note.id)
        .bind(&note.owner_id)
        .bind(&note.title)
        .bind(&note.body)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(note)
    }

    async fn get_note(&self, id: &str, owner_id: &str) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT id, owner_id, title, body, created_at, updated_at
             FROM notes WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>, StoreError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT id, owner_id, title, body, created_at, updated_at
             FROM notes WHERE owner_id = ?
             ORDER BY updated_at DESC, rowid DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    async fn delete_note(&self, id: &str, owner_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Ingredient;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", 1).await.unwrap()
    }

    fn draft(name: &str, ingredients: &[(&str, f64, &str)]) -> RecipeDraft {
        RecipeDraft {
            name: name.to_string(),
            link_url: String::new(),
            ingredients: ingredients
                .iter()
                .map(|(n, q, u)| Ingredient {
                    name: n.to_string(),
                    quantity: *q,
                    unit: u.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_recipe_round_trip_keeps_ingredient_order() {
        let store = memory_store().await;
        let user = store.create_user("a@example.com", "hash").await.unwrap();

        let created = store
            .create_recipe(
                &user.id,
                &draft("Toast", &[("Bread", 1.0, "loaf"), ("Butter", 20.0, "grams")]),
            )
            .await
            .unwrap();

        let fetched = store.get_recipe(&created.id, &user.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Toast");
        let names: Vec<_> = fetched.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Bread", "Butter"]);
        assert_eq!(fetched.ingredients[1].quantity, 20.0);
        assert_eq!(fetched.ingredients, created.ingredients);
    }

    #[tokio::test]
    async fn test_recipes_are_owner_scoped() {
        let store = memory_store().await;
        let alice = store.create_user("alice@example.com", "h").await.unwrap();
        let bob = store.create_user("bob@example.com", "h").await.unwrap();

        let recipe = store
            .create_recipe(&alice.id, &draft("Soup", &[("Leek", 2.0, "kg")]))
            .await
            .unwrap();

        assert!(store.get_recipe(&recipe.id, &bob.id).await.unwrap().is_none());
        assert!(store.list_recipes(&bob.id).await.unwrap().is_empty());
        assert!(!store.delete_recipe(&recipe.id, &bob.id).await.unwrap());
        assert!(store.get_recipe(&recipe.id, &alice.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_recipes_newest_first_with_counts() {
        let store = memory_store().await;
        let user = store.create_user("c@example.com", "h").await.unwrap();

        store
            .create_recipe(&user.id, &draft("First", &[("A", 1.0, "g")]))
            .await
            .unwrap();
        store
            .create_recipe(&user.id, &draft("Second", &[("A", 1.0, "g"), ("B", 2.0, "g")]))
            .await
            .unwrap();

        let list = store.list_recipes(&user.id).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Second");
        assert_eq!(list[0].ingredient_count, 2);
        assert_eq!(list[1].ingredient_count, 1);
    }

    #[tokio::test]
    async fn test_delete_recipe_removes_ingredients() {
        let store = memory_store().await;
        let user = store.create_user("d@example.com", "h").await.unwrap();
        let recipe = store
            .create_recipe(&user.id, &draft("Gone", &[("X", 1.0, "g")]))
            .await
            .unwrap();

        assert!(store.delete_recipe(&recipe.id, &user.id).await.unwrap());
        assert!(store.get_recipe(&recipe.id, &user.id).await.unwrap().is_none());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = memory_store().await;
        store.create_user("dup@example.com", "h").await.unwrap();
        let err = store.create_user("dup@example.com", "h").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_sessions_expire_and_delete() {
        let store = memory_store().await;
        let user = store.create_user("e@example.com", "h").await.unwrap();
        let session = store.create_session(&user.id, 1_000).await.unwrap();

        assert_eq!(session.token.len(), 64);
        assert_eq!(
            store.session_user(&session.token, 999).await.unwrap().as_deref(),
            Some(user.id.as_str())
        );
        assert!(store.session_user(&session.token, 1_000).await.unwrap().is_none());

        store.delete_session(&session.token).await.unwrap();
        assert!(store.session_user(&session.token, 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_notes_crud() {
        let store = memory_store().await;
        let user = store.create_user("f@example.com", "h").await.unwrap();
        let note = store
            .create_note(
                &user.id,
                &NoteDraft {
                    title: "Shopping".into(),
                    body: "Eggs".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.list_notes(&user.id).await.unwrap().len(), 1);
        assert_eq!(
            store.get_note(&note.id, &user.id).await.unwrap().unwrap().body,
            "Eggs"
        );
        assert!(store.delete_note(&note.id, &user.id).await.unwrap());
        assert!(store.get_note(&note.id, &user.id).await.unwrap().is_none());
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_database_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("pantry.db").display());

        let user_id = {
            let store = SqliteStore::connect(&url, 2).await.unwrap();
            let user = store.create_user("g@example.com", "h").await.unwrap();
            store.close().await;
            user.id
        };

        let store = SqliteStore::connect(&url, 2).await.unwrap();
        let user = store.user_by_email("g@example.com").await.unwrap().unwrap();
        assert_eq!(user.id, user_id);
        assert!(store.user_by_id(&user_id).await.unwrap().is_some());
    }
}
