//! Multi-field decoding into per-row ingredient objects.

use std::collections::HashSet;

use crate::form::FormData;

/// One ingredient row as submitted. `None` means the row had no value for
/// that field (the field was repeated fewer times than the longest one).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngredientRow {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

impl IngredientRow {
    /// Empty row offered for the next ingredient.
    pub fn blank() -> Self {
        Self {
            name: Some(String::new()),
            quantity: Some(String::new()),
            unit: Some(String::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn quantity(&self) -> &str {
        self.quantity.as_deref().unwrap_or("")
    }

    pub fn unit(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }
}

/// Decoded recipe form, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipeForm {
    /// First `name` value, empty if absent.
    pub name: String,
    /// First `linkUrl` value, empty if absent.
    pub link_url: String,
    pub rows: Vec<IngredientRow>,
}

impl RecipeForm {
    /// Ingredient names in row order, skipping rows without one.
    pub fn ingredient_names(&self) -> Vec<&str> {
        self.rows.iter().filter_map(|r| r.name.as_deref()).collect()
    }

    pub fn quantities(&self) -> Vec<&str> {
        self.rows.iter().filter_map(|r| r.quantity.as_deref()).collect()
    }

    pub fn units(&self) -> Vec<&str> {
        self.rows.iter().filter_map(|r| r.unit.as_deref()).collect()
    }
}

/// Decode `name`, `linkUrl` and the repeated ingredient fields.
///
/// The row count is the longest of `ingredient`, `quantity` and `unit`.
/// `deleteIngredient` values name row indices to drop.
pub fn decode_recipe_form(form: &FormData) -> RecipeForm {
    let names = form.get_all("ingredient");
    let quantities = form.get_all("quantity");
    let units = form.get_all("unit");

    let deleted: HashSet<usize> = form
        .get_all("deleteIngredient")
        .into_iter()
        .filter_map(|v| v.trim().parse().ok())
        .collect();

    let count = names.len().max(quantities.len()).max(units.len());
    let rows = (0..count)
        .filter(|i| !deleted.contains(i))
        .map(|i| IngredientRow {
            name: cell(&names, i),
            quantity: cell(&quantities, i),
            unit: cell(&units, i),
        })
        .collect();

    RecipeForm {
        name: form.get("name").unwrap_or_default().to_string(),
        link_url: form.get("linkUrl").unwrap_or_default().to_string(),
        rows,
    }
}

fn cell(values: &[&str], i: usize) -> Option<String> {
    values.get(i).map(|v| v.to_string())
}

/// Form shown by `GET /recipes/new`: whatever the query string carried
/// plus one blank row to type the next ingredient into. Never validated.
pub fn prefill_recipe_form(query: &FormData) -> RecipeForm {
    let mut form = decode_recipe_form(query);
    form.rows.push(IngredientRow::blank());
    form
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: Option<&str>, quantity: Option<&str>, unit: Option<&str>) -> IngredientRow {
        IngredientRow {
            name: name.map(str::to_string),
            quantity: quantity.map(str::to_string),
            unit: unit.map(str::to_string),
        }
    }

    #[test]
    fn test_decode_aligned_rows() {
        let form = FormData::from_query(
            "name=Toast&linkUrl=http%3A%2F%2Fx&ingredient=Bread&quantity=1&unit=loaf\
             &ingredient=Butter&quantity=20&unit=grams",
        );
        let decoded = decode_recipe_form(&form);

        assert_eq!(decoded.name, "Toast");
        assert_eq!(decoded.link_url, "http://x");
        assert_eq!(
            decoded.rows,
            vec![
                row(Some("Bread"), Some("1"), Some("loaf")),
                row(Some("Butter"), Some("20"), Some("grams")),
            ]
        );
        assert_eq!(decoded.ingredient_names(), vec!["Bread", "Butter"]);
        assert_eq!(decoded.quantities(), vec!["1", "20"]);
        assert_eq!(decoded.units(), vec!["loaf", "grams"]);
    }

    #[test]
    fn test_decode_missing_scalars_default_to_empty() {
        let decoded = decode_recipe_form(&FormData::new());
        assert_eq!(decoded, RecipeForm::default());
        assert!(decoded.ingredient_names().is_empty());
    }

    #[test]
    fn test_decode_misaligned_fields_leave_holes() {
        let form = FormData::from_query("ingredient=Bread&ingredient=Butter&quantity=1&unit=g");
        let decoded = decode_recipe_form(&form);

        assert_eq!(decoded.rows.len(), 2);
        assert_eq!(decoded.rows[1], row(Some("Butter"), None, None));
        assert_eq!(decoded.quantities(), vec!["1"]);
    }

    #[test]
    fn test_decode_drops_deleted_rows() {
        let form = FormData::from_query(
            "ingredient=A&quantity=1&unit=g&ingredient=B&quantity=2&unit=kg\
             &ingredient=C&quantity=3&unit=l&deleteIngredient=1&deleteIngredient=on",
        );
        let decoded = decode_recipe_form(&form);
        assert_eq!(decoded.ingredient_names(), vec!["A", "C"]);
        assert_eq!(decoded.units(), vec!["g", "l"]);
    }

    #[test]
    fn test_decode_is_idempotent() {
        let form = FormData::from_query("name=Soup&ingredient=Leek&quantity=2&unit=kg");
        assert_eq!(decode_recipe_form(&form), decode_recipe_form(&form));
    }

    #[test]
    fn test_prefill_appends_blank_row() {
        let form = prefill_recipe_form(&FormData::from_query(
            "name=Toast&ingredient=Bread&quantity=abc&unit=loaf",
        ));
        assert_eq!(form.rows.len(), 2);
        // Prefill never validates; the bad quantity is shown back as typed
        assert_eq!(form.rows[0].quantity(), "abc");
        assert_eq!(form.rows[1], IngredientRow::blank());

        let empty = prefill_recipe_form(&FormData::new());
        assert_eq!(empty.rows, vec![IngredientRow::blank()]);
    }
}
