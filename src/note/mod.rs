//! Note form validation.

use crate::form::{Field, FieldError, FormData};

pub const TITLE_REQUIRED: FieldError = FieldError::new(Field::Title, "Title is required");
pub const BODY_REQUIRED: FieldError = FieldError::new(Field::Body, "Body is required");

/// A note that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub body: String,
}

/// `title` is checked before `body`; only the first failure is reported.
pub fn validate_note_form(form: &FormData) -> Result<NoteDraft, FieldError> {
    let title = form.get("title").unwrap_or_default();
    if title.is_empty() {
        return Err(TITLE_REQUIRED);
    }

    let body = form.get("body").unwrap_or_default();
    if body.is_empty() {
        return Err(BODY_REQUIRED);
    }

    Ok(NoteDraft {
        title: title.to_string(),
        body: body.to_string(),
    })
}
