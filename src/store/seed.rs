//! Demo account and data.

use tracing::info;

use super::{SqliteStore, Store};
use crate::auth::hash_password;
use crate::note::NoteDraft;
use crate::recipe::{Ingredient, RecipeDraft};

pub const SEED_EMAIL: &str = "joe@joescript.io";
pub const SEED_PASSWORD: &str = "joes-pantry";

fn ingredient(name: &str, quantity: f64, unit: &str) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        quantity,
        unit: unit.to_string(),
    }
}

/// Replace the demo user (and everything it owns) with a fresh copy.
pub async fn seed(store: &SqliteStore) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    sqlx::query("DELETE FROM users WHERE email = ?")
        .bind(SEED_EMAIL)
        .execute(store.pool())
        .await?;

    let user = store
        .create_user(SEED_EMAIL, &hash_password(SEED_PASSWORD)?)
        .await?;

    let recipes = [
        RecipeDraft {
            name: "Beans on Toast".into(),
            link_url: String::new(),
            ingredients: vec![
                ingredient("Beans", 1.0, "tin"),
                ingredient("Butter", 20.0, "grams"),
                ingredient("Bread", 1.0, "loaf"),
            ],
        },
        RecipeDraft {
            name: "Mac and cheese".into(),
            link_url: String::new(),
            ingredients: vec![
                ingredient("Macaroni", 500.0, "grams"),
                ingredient("cheese", 400.0, "grams"),
            ],
        },
    ];
    for recipe in &recipes {
        store.create_recipe(&user.id, recipe).await?;
    }

    for title in ["My first note", "My second note"] {
        let note = NoteDraft {
            title: title.into(),
            body: "Hello, world!".into(),
        };
        store.create_note(&user.id, &note).await?;
    }

    info!(email = SEED_EMAIL, "Database has been seeded");
    Ok(())
}
