//! Landing, login and join pages.

use super::{error_message, escape, field_attrs, layout};
use crate::form::{Field, FieldError};

pub fn index_page(signed_in: bool) -> String {
    let actions = if signed_in {
        r#"<a href="/recipes">View Recipes</a> <a href="/notes">View Notes</a>"#
    } else {
        r#"<a href="/join">Sign up</a> <a href="/login">Log In</a>"#
    };

    let html = format!(
        "<h2>Your pantry</h2>\n<p>Keep your recipes and notes in one place.</p>\n<p>{}</p>",
        actions
    );
    layout("Pantry", signed_in, &html)
}

fn credentials_form(
    action: &str,
    submit: &str,
    email: &str,
    redirect_to: &str,
    error: Option<&FieldError>,
) -> String {
    // Focus email unless the password is what failed
    let email_attrs = match error {
        Some(e) if e.field == Field::Password => String::new(),
        Some(_) => field_attrs(Field::Email, error),
        None => " autofocus".to_string(),
    };

    format!(
        r#"<form method="post" action="{action}">
  <div>
    <label><span>Email address</span><input id="email" name="email" type="email" autocomplete="email" value="{email}"{email_attrs}></label>
    {email_error}
  </div>
  <div>
    <label><span>Password</span><input id="password" name="password" type="password" autocomplete="current-password"{password_attrs}></label>
    {password_error}
  </div>
  <input type="hidden" name="redirectTo" value="{redirect_to}">
  <button type="submit">{submit}</button>
</form>"#,
        action = action,
        email = escape(email),
        email_attrs = email_attrs,
        email_error = error_message(Field::Email, error),
        password_attrs = field_attrs(Field::Password, error),
        password_error = error_message(Field::Password, error),
        redirect_to = escape(redirect_to),
        submit = submit,
    )
}

pub fn login_page(email: &str, redirect_to: &str, error: Option<&FieldError>) -> String {
    let html = format!(
        r#"<h2>Log in</h2>
{form}
<p>Don't have an account? <a href="/join?redirectTo={back}">Sign up</a></p>"#,
        form = credentials_form("/login", "Log in", email, redirect_to, error),
        back = escape(&percent_encoding::utf8_percent_encode(
            redirect_to,
            percent_encoding::NON_ALPHANUMERIC
        )
        .to_string()),
    );
    layout("Log in", false, &html)
}

pub fn join_page(email: &str, redirect_to: &str, error: Option<&FieldError>) -> String {
    let html = format!(
        r#"<h2>Create account</h2>
{form}
<p>Already have an account? <a href="/login?redirectTo={back}">Log in</a></p>"#,
        form = credentials_form("/join", "Create Account", email, redirect_to, error),
        back = escape(&percent_encoding::utf8_percent_encode(
            redirect_to,
            percent_encoding::NON_ALPHANUMERIC
        )
        .to_string()),
    );
    layout("Sign up", false, &html)
}
