use tracing::{info, warn};

use super::App;
use crate::auth::{
    clear_session_cookie, current_user_id, hash_password_blocking, safe_redirect, start_session,
    validate_credentials, verify_password_blocking, EMAIL_TAKEN, LOGIN_FAILED,
};
use crate::core::{Request, Response, Result};
use crate::store::{Store, StoreError};
use crate::views;

impl<S: Store> App<S> {
    pub(super) async fn index(&self, req: &Request) -> Result<Response> {
        let signed_in = current_user_id(&*self.store, &self.session, req)
            .await?
            .is_some();
        Ok(Response::html(views::index_page(signed_in)))
    }

    pub(super) async fn join_page(&self, req: &Request) -> Result<Response> {
        if current_user_id(&*self.store, &self.session, req).await?.is_some() {
            return Ok(Response::found("/"));
        }

        let query = req.form().await?;
        let redirect_to = safe_redirect(query.get("redirectTo"), "/");
        Ok(Response::html(views::join_page("", redirect_to, None)))
    }

    pub(super) async fn join_submit(&self, req: &Request) -> Result<Response> {
        let form = req.form().await?;
        let redirect_to = safe_redirect(form.get("redirectTo"), "/");
        let email = form.get("email").unwrap_or_default();

        let credentials = match validate_credentials(&form) {
            Ok(c) => c,
            Err(error) => {
                return Ok(self.rejected(req, &error, || {
                    views::join_page(email, redirect_to, Some(&error))
                }))
            }
        };

        if self.store.user_by_email(&credentials.email).await?.is_some() {
            return Ok(self.rejected(req, &EMAIL_TAKEN, || {
                views::join_page(email, redirect_to, Some(&EMAIL_TAKEN))
            }));
        }

        let hash = hash_password_blocking(credentials.password.clone()).await?;
        let user = match self.store.create_user(&credentials.email, &hash).await {
            Ok(user) => user,
            // Lost a race with another registration for the same address
            Err(StoreError::Conflict(_)) => {
                return Ok(self.rejected(req, &EMAIL_TAKEN, || {
                    views::join_page(email, redirect_to, Some(&EMAIL_TAKEN))
                }))
            }
            Err(e) => return Err(e.into()),
        };

        self.metrics.users_created_total.inc();
        info!(user_id = %user.id, "User registered");

        let cookie = start_session(&*self.store, &self.session, &user.id).await?;
        Ok(Response::see_other(redirect_to).with_cookie(&cookie))
    }

    pub(super) async fn login_page(&self, req: &Request) -> Result<Response> {
        if current_user_id(&*self.store, &self.session, req).await?.is_some() {
            return Ok(Response::found("/"));
        }

        let query = req.form().await?;
        let redirect_to = safe_redirect(query.get("redirectTo"), "/");
        Ok(Response::html(views::login_page("", redirect_to, None)))
    }

    pub(super) async fn login_submit(&self, req: &Request) -> Result<Response> {
        let form = req.form().await?;
        let redirect_to = safe_redirect(form.get("redirectTo"), "/");
        let email = form.get("email").unwrap_or_default();

        let credentials = match validate_credentials(&form) {
            Ok(c) => c,
            Err(error) => {
                return Ok(self.rejected(req, &error, || {
                    views::login_page(email, redirect_to, Some(&error))
                }))
            }
        };

        let user = match self.store.user_by_email(&credentials.email).await? {
            Some(user) => {
                let matches = verify_password_blocking(
                    credentials.password.clone(),
                    user.password_hash.clone(),
                )
                .await?;
                matches.then_some(user)
            }
            None => None,
        };

        let Some(user) = user else {
            warn!("Login failed");
            return Ok(self.rejected(req, &LOGIN_FAILED, || {
                views::login_page(email, redirect_to, Some(&LOGIN_FAILED))
            }));
        };

        info!(user_id = %user.id, "User logged in");
        let cookie = start_session(&*self.store, &self.session, &user.id).await?;
        Ok(Response::see_other(redirect_to).with_cookie(&cookie))
    }

    pub(super) async fn logout(&self, req: &Request) -> Result<Response> {
        if let Some(token) = req.cookie(&self.session.cookie_name) {
            self.store.delete_session(&token).await?;
        }
        Ok(Response::see_other("/").with_cookie(&clear_session_cookie(&self.session)))
    }
}
