//! Identity: credential checks, sessions and login redirects.

mod password;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::config::SessionConfig;
use crate::core::{Request, Response, Result};
use crate::form::{Field, FieldError, FormData};
use crate::store::{now_millis, Session, Store};

pub use password::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking, HASH_COST,
};

pub const EMAIL_INVALID: FieldError = FieldError::new(Field::Email, "Email is invalid");
pub const PASSWORD_REQUIRED: FieldError = FieldError::new(Field::Password, "Password is required");
pub const PASSWORD_TOO_SHORT: FieldError =
    FieldError::new(Field::Password, "Password is too short");
pub const LOGIN_FAILED: FieldError = FieldError::new(Field::Email, "Invalid email or password");
pub const EMAIL_TAKEN: FieldError =
    FieldError::new(Field::Email, "A user already exists with this email");

const MIN_PASSWORD_CHARS: usize = 8;

/// Email and password from a login or join form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Loose check: longer than three characters and contains `@`.
pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() > 3 && email.contains('@')
}

/// Email first, then password presence, then password length.
pub fn validate_credentials(form: &FormData) -> std::result::Result<Credentials, FieldError> {
    let email = form.get("email").unwrap_or_default();
    if !is_valid_email(email) {
        return Err(EMAIL_INVALID);
    }

    let password = form.get("password").unwrap_or_default();
    if password.is_empty() {
        return Err(PASSWORD_REQUIRED);
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(PASSWORD_TOO_SHORT);
    }

    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Only same-site absolute paths are followed; anything else falls back to `default`.
pub fn safe_redirect<'a>(target: Option<&'a str>, default: &'a str) -> &'a str {
    match target {
        Some(to) if to.starts_with('/') && !to.starts_with("//") => to,
        _ => default,
    }
}

/// `Set-Cookie` value carrying a new session.
pub fn session_cookie(config: &SessionConfig, session: &Session) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.cookie_name,
        session.token,
        config.ttl.as_secs()
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name
    )
}

/// Create a session for `user_id` and return the cookie to set.
pub async fn start_session<S: Store + ?Sized>(
    store: &S,
    config: &SessionConfig,
    user_id: &str,
) -> Result<String> {
    let expires_at = now_millis() + config.ttl.as_millis() as i64;
    let session = store.create_session(user_id, expires_at).await?;
    Ok(session_cookie(config, &session))
}

/// User id behind the request's session cookie, if it is live.
pub async fn current_user_id<S: Store + ?Sized>(
    store: &S,
    config: &SessionConfig,
    req: &Request,
) -> Result<Option<String>> {
    let Some(token) = req.cookie(&config.cookie_name) else {
        return Ok(None);
    };
    Ok(store.session_user(&token, now_millis()).await?)
}

/// 302 to the login page, coming back to the current path afterwards.
pub fn login_redirect(req: &Request) -> Response {
    let back = utf8_percent_encode(req.path_and_query(), NON_ALPHANUMERIC);
    Response::found(&format!("/login?redirectTo={}", back))
}

/// The signed-in user's id, or the login redirect to send instead.
pub async fn require_user_id<S: Store + ?Sized>(
    store: &S,
    config: &SessionConfig,
    req: &Request,
) -> Result<std::result::Result<String, Response>> {
    Ok(current_user_id(store, config, req)
        .await?
        .ok_or_else(|| login_redirect(req)))
}
