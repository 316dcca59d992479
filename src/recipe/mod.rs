//! Recipe form pipeline.
//!
//! Both the prefilled form page (GET, reading the query string) and the
//! submission handler (POST, reading the body) go through the same decoder.
//! The decoder turns the repeated `ingredient` / `quantity` / `unit` fields
//! into one list of per-row objects, so a submission with misaligned field
//! counts surfaces as a missing cell in some row instead of a silent shift.
//! Validation then walks a fixed rule order and reports the first failure.

mod decode;
mod validate;

pub use decode::{decode_recipe_form, prefill_recipe_form, IngredientRow, RecipeForm};
pub use validate::{
    parse_quantity, validate_recipe_form, INGREDIENTS_NOT_STRINGS, NAME_REQUIRED, NO_INGREDIENTS,
    QUANTITIES_NOT_NUMBERS, QUANTITIES_NOT_STRINGS, UNITS_MISSING,
};

/// One validated ingredient. Its position in [`RecipeDraft::ingredients`] is its row.
#[derive(Clone, Debug, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

/// A recipe that passed validation and is ready to be stored.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeDraft {
    pub name: String,
    /// Possibly empty.
    pub link_url: String,
    pub ingredients: Vec<Ingredient>,
}

/// Render a quantity for a form field or a detail page: `1` rather than `1.0`.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        quantity.to_string()
    }
}
