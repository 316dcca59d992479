//! Server-rendered HTML pages.
//!
//! Every piece of user-supplied text goes through [`escape`] before it is
//! interpolated. Forms re-rendered after a validation failure mark the
//! offending input with `aria-invalid`, point `aria-errormessage` at the
//! message element (`<field>-error`) and give it `autofocus`.

mod auth;
mod notes;
mod recipes;

use std::borrow::Cow;

use crate::form::{Field, FieldError};

pub use auth::{index_page, join_page, login_page};
pub use notes::{note_detail, note_form, note_list, note_not_found};
pub use recipes::{recipe_detail, recipe_form, recipe_list, recipe_not_found};

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Wrap page content in the shared document shell.
pub fn layout(title: &str, signed_in: bool, content: &str) -> String {
    let nav = if signed_in {
        r#"<a href="/recipes">Recipes</a> <a href="/notes">Notes</a>
      <form action="/logout" method="post" class="inline"><button type="submit">Logout</button></form>"#
    } else {
        r#"<a href="/join">Sign up</a> <a href="/login">Log In</a>"#
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} · Pantry</title>
  <style>{STYLE}</style>
</head>
<body>
  <header>
    <h1><a href="/">Pantry</a></h1>
    <nav>{nav}</nav>
  </header>
  <main>
{content}
  </main>
</body>
</html>
"#,
        title = escape(title),
        nav = nav,
        content = content,
    )
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0}\
header{display:flex;justify-content:space-between;align-items:center;padding:1rem 2rem;background:#1e293b;color:#fff}\
header a{color:#fff}main{padding:2rem;max-width:48rem}\
form.inline{display:inline}label{display:flex;flex-direction:column;gap:.25rem}\
.ingredient-input-group{display:flex;gap:1rem;align-items:end;margin:.5rem 0}\
.error{color:#b91c1c;padding-top:.25rem}";

/// Attributes for an input that may be the subject of `error`.
fn field_attrs(field: Field, error: Option<&FieldError>) -> String {
    match error {
        Some(e) if e.field == field => format!(
            r#" aria-invalid="true" aria-errormessage="{}-error" autofocus"#,
            field.as_str()
        ),
        _ => String::new(),
    }
}

/// Message element referenced by `aria-errormessage`, when `error` is about `field`.
fn error_message(field: Field, error: Option<&FieldError>) -> String {
    match error {
        Some(e) if e.field == field => format!(
            r#"<div class="error" id="{}-error">{}</div>"#,
            field.as_str(),
            escape(e.message)
        ),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert!(matches!(escape("plain text"), Cow::Borrowed(_)));
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_layout_nav_depends_on_session() {
        assert!(layout("Home", true, "").contains(r#"action="/logout""#));
        assert!(layout("Home", false, "").contains(r#"href="/login""#));
        assert!(layout("<b>", false, "").contains("<title>&lt;b&gt; · Pantry</title>"));
    }

    #[test]
    fn test_error_attrs_only_for_matching_field() {
        let err = FieldError::new(Field::Name, "Name is required");
        assert!(field_attrs(Field::Name, Some(&err)).contains(r#"aria-errormessage="name-error""#));
        assert!(field_attrs(Field::LinkUrl, Some(&err)).is_empty());
        assert!(field_attrs(Field::Name, None).is_empty());
        assert_eq!(
            error_message(Field::Name, Some(&err)),
            r#"<div class="error" id="name-error">Name is required</div>"#
        );
    }
}
