//! Recipe validation: fixed rule order, first failure wins.

use super::{Ingredient, RecipeDraft, RecipeForm};
use crate::form::{Field, FieldError};

pub const NAME_REQUIRED: FieldError = FieldError::new(Field::Name, "Name is required");
pub const INGREDIENTS_NOT_STRINGS: FieldError =
    FieldError::new(Field::Ingredients, "Ingredients must be strings");
pub const QUANTITIES_NOT_STRINGS: FieldError =
    FieldError::new(Field::Quantities, "Quantities must be strings");
pub const QUANTITIES_NOT_NUMBERS: FieldError =
    FieldError::new(Field::Quantities, "Quantities must be numbers");
pub const UNITS_MISSING: FieldError =
    FieldError::new(Field::Units, "At least 1 ingredient must be defined");
pub const NO_INGREDIENTS: FieldError =
    FieldError::new(Field::Ingredients, "ingredient name must be set");

/// Decimal quantity, surrounding whitespace allowed. Infinities and NaN are rejected.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|q| q.is_finite())
}

/// Validate a decoded form into a [`RecipeDraft`].
///
/// `linkUrl` has no rule of its own: after decoding it is always a string.
pub fn validate_recipe_form(form: &RecipeForm) -> Result<RecipeDraft, FieldError> {
    if form.name.is_empty() {
        return Err(NAME_REQUIRED);
    }

    if form
        .rows
        .iter()
        .any(|row| row.name.as_deref().is_none_or(|n| n.trim().is_empty()))
    {
        return Err(INGREDIENTS_NOT_STRINGS);
    }

    if form
        .rows
        .iter()
        .any(|row| row.quantity.as_deref().is_none_or(str::is_empty))
    {
        return Err(QUANTITIES_NOT_STRINGS);
    }

    let mut quantities = Vec::with_capacity(form.rows.len());
    for row in &form.rows {
        match parse_quantity(row.quantity()) {
            Some(q) => quantities.push(q),
            None => return Err(QUANTITIES_NOT_NUMBERS),
        }
    }

    if form.rows.iter().any(|row| row.unit.is_none()) {
        return Err(UNITS_MISSING);
    }

    if form.rows.is_empty() {
        return Err(NO_INGREDIENTS);
    }

    let ingredients = form
        .rows
        .iter()
        .zip(quantities)
        .map(|(row, quantity)| Ingredient {
            name: row.name().trim().to_string(),
            quantity,
            unit: row.unit().to_string(),
        })
        .collect();

    Ok(RecipeDraft {
        name: form.name.clone(),
        link_url: form.link_url.clone(),
        ingredients,
    })
}
