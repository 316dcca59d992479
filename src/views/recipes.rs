//! Recipe pages.

use super::{error_message, escape, field_attrs, layout};
use crate::form::{Field, FieldError};
use crate::recipe::{format_quantity, parse_quantity, IngredientRow, RecipeForm};
use crate::store::{Recipe, RecipeSummary};

/// Units offered in the unit select, with their labels.
const UNITS: &[(&str, &str)] = &[
    ("g", "Grams"),
    ("kg", "Kilos"),
    ("ml", "Milliliters"),
    ("l", "Liters"),
];

/// Row holding the value a row-level error is about.
fn offending_row(rows: &[IngredientRow], field: Field) -> Option<usize> {
    match field {
        Field::Ingredients => rows
            .iter()
            .position(|r| r.name.as_deref().is_none_or(|n| n.trim().is_empty())),
        Field::Quantities => rows
            .iter()
            .position(|r| parse_quantity(r.quantity()).is_none()),
        Field::Units => rows.iter().position(|r| r.unit.is_none()),
        _ => None,
    }
}

fn is_row_field(field: Field) -> bool {
    matches!(field, Field::Ingredients | Field::Quantities | Field::Units)
}

fn unit_options(current: &str) -> String {
    let mut out = String::new();

    // Units outside the fixed list (seeded "grams", prefilled links) stay selectable
    if !current.is_empty() && !UNITS.iter().any(|(value, _)| *value == current) {
        out.push_str(&format!(
            r#"<option value="{0}" selected>{0}</option>"#,
            escape(current)
        ));
    }

    for (value, label) in UNITS {
        let selected = if *value == current { " selected" } else { "" };
        out.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            value, selected, label
        ));
    }
    out
}

fn ingredient_row(
    i: usize,
    row: &IngredientRow,
    total: usize,
    error: Option<&FieldError>,
    focus: bool,
) -> String {
    let mut name_attrs = field_attrs(Field::Ingredients, error);
    if focus && name_attrs.is_empty() {
        name_attrs.push_str(" autofocus");
    }

    let delete = if total != 1 {
        format!(
            r#"
    <div class="button-group"><label>delete ingredient <input type="checkbox" name="deleteIngredient" value="{}" aria-label="Delete ingredient"></label></div>"#,
            i
        )
    } else {
        String::new()
    };

    let row_error = error
        .map(|e| error_message(e.field, Some(e)))
        .unwrap_or_default();

    format!(
        r#"  <div class="ingredient-input-group">
    <label><span>Ingredient {number}: </span><input name="ingredient" id="ingredient-{i}" value="{name}" autocomplete="off"{name_attrs}></label>
    <label><span>Quantity: </span><input name="quantity" type="number" step="any" value="{quantity}"{quantity_attrs}></label>
    <label><span>Unit: </span><select name="unit"{unit_attrs}>{options}</select></label>{delete}
  </div>
  {row_error}
"#,
        number = i + 1,
        i = i,
        name = escape(row.name()),
        name_attrs = name_attrs,
        quantity = escape(row.quantity()),
        quantity_attrs = field_attrs(Field::Quantities, error),
        unit_attrs = field_attrs(Field::Units, error),
        options = unit_options(row.unit()),
        delete = delete,
        row_error = row_error,
    )
}

/// The new-recipe form. Without an error the last ingredient row gets focus.
pub fn recipe_form(form: &RecipeForm, error: Option<&FieldError>) -> String {
    let blank = [IngredientRow::blank()];
    let rows: &[IngredientRow] = if form.rows.is_empty() {
        &blank
    } else {
        &form.rows
    };

    let error_row = error.and_then(|e| offending_row(rows, e.field));

    let mut html = format!(
        r#"<h2>New Recipe</h2>
<form method="post" action="/recipes/new">
  <div>
    <label><span>Name: </span><input name="name" value="{name}"{name_attrs}></label>
    {name_error}
  </div>
  <div>
    <label><span>Link URL: </span><input name="linkUrl" value="{link_url}"{link_attrs}></label>
    {link_error}
  </div>
"#,
        name = escape(&form.name),
        name_attrs = field_attrs(Field::Name, error),
        name_error = error_message(Field::Name, error),
        link_url = escape(&form.link_url),
        link_attrs = field_attrs(Field::LinkUrl, error),
        link_error = error_message(Field::LinkUrl, error),
    );

    for (i, row) in rows.iter().enumerate() {
        let row_error = if error_row == Some(i) { error } else { None };
        let focus = error.is_none() && i + 1 == rows.len();
        html.push_str(&ingredient_row(i, row, rows.len(), row_error, focus));
    }

    if let Some(e) = error.filter(|e| is_row_field(e.field) && error_row.is_none()) {
        html.push_str(&error_message(e.field, Some(e)));
    }

    html.push_str(
        r#"  <div class="text-right"><button type="submit" formmethod="post">Save</button></div>
  <div class="text-right"><button type="submit" formmethod="get">Add Ingredient</button></div>
</form>"#,
    );

    layout("New Recipe", true, &html)
}

pub fn recipe_list(recipes: &[RecipeSummary]) -> String {
    let mut html = String::from(
        r#"<h2>Recipes</h2>
<p><a href="/recipes/new">+ New Recipe</a></p>
"#,
    );

    if recipes.is_empty() {
        html.push_str("<p>No recipes yet</p>");
    } else {
        html.push_str("<ol>\n");
        for recipe in recipes {
            let plural = if recipe.ingredient_count == 1 { "" } else { "s" };
            html.push_str(&format!(
                "  <li><a href=\"/recipes/{}\">{}</a> <span>({} ingredient{})</span></li>\n",
                escape(&recipe.id),
                escape(&recipe.name),
                recipe.ingredient_count,
                plural
            ));
        }
        html.push_str("</ol>");
    }

    layout("Recipes", true, &html)
}

pub fn recipe_detail(recipe: &Recipe) -> String {
    let link = if recipe.link_url.starts_with("http://") || recipe.link_url.starts_with("https://")
    {
        format!(
            r#"<a href="{0}" rel="noopener noreferrer">{0}</a>"#,
            escape(&recipe.link_url)
        )
    } else {
        escape(&recipe.link_url).into_owned()
    };

    let items: String = recipe
        .ingredients
        .iter()
        .map(|i| {
            format!(
                "  <li>{} {} {}</li>\n",
                escape(&i.name),
                format_quantity(i.quantity),
                escape(&i.unit)
            )
        })
        .collect();

    let html = format!(
        r#"<h3>{name}</h3>
<p>{link}</p>
<ul>
{items}</ul>
<hr>
<form method="post" action="/recipes/{id}">
  <button type="submit">Delete</button>
</form>"#,
        name = escape(&recipe.name),
        link = link,
        items = items,
        id = escape(&recipe.id),
    );

    layout(&recipe.name, true, &html)
}

pub fn recipe_not_found() -> String {
    layout("Not found", true, "<div>Recipe not found</div>")
}
