//! Note pages.

use super::{error_message, escape, field_attrs, layout};
use crate::form::{Field, FieldError};
use crate::store::Note;

/// New-note form, re-rendered with the submitted values on error.
pub fn note_form(title: &str, body: &str, error: Option<&FieldError>) -> String {
    let html = format!(
        r#"<h2>New Note</h2>
<form method="post" action="/notes/new">
  <div>
    <label><span>Title: </span><input name="title" value="{title}"{title_attrs}></label>
    {title_error}
  </div>
  <div>
    <label><span>Body: </span><textarea name="body" rows="8"{body_attrs}>{body}</textarea></label>
    {body_error}
  </div>
  <div class="text-right"><button type="submit">Save</button></div>
</form>"#,
        title = escape(title),
        title_attrs = field_attrs(Field::Title, error),
        title_error = error_message(Field::Title, error),
        body = escape(body),
        body_attrs = field_attrs(Field::Body, error),
        body_error = error_message(Field::Body, error),
    );

    layout("New Note", true, &html)
}

pub fn note_list(notes: &[Note]) -> String {
    let mut html = String::from("<h2>Notes</h2>\n<p><a href=\"/notes/new\">+ New Note</a></p>\n");

    if notes.is_empty() {
        html.push_str("<p>No notes yet</p>");
    } else {
        html.push_str("<ol>\n");
        for note in notes {
            html.push_str(&format!(
                "  <li><a href=\"/notes/{}\">📝 {}</a></li>\n",
                escape(&note.id),
                escape(&note.title)
            ));
        }
        html.push_str("</ol>");
    }

    layout("Notes", true, &html)
}

pub fn note_detail(note: &Note) -> String {
    let html = format!(
        r#"<h3>{title}</h3>
<p style="white-space:pre-wrap">{body}</p>
<hr>
<form method="post" action="/notes/{id}">
  <button type="submit">Delete</button>
</form>"#,
        title = escape(&note.title),
        body = escape(&note.body),
        id = escape(&note.id),
    );

    layout(&note.title, true, &html)
}

pub fn note_not_found() -> String {
    layout("Not found", true, "<div>Note not found</div>")
}
