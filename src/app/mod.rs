//! Request handlers for the pantry pages.
//!
//! [`App`] resolves the path to a [`Route`], checks the method, and hands
//! the request to one of the page handlers in `auth`, `recipes` or `notes`.
//! Handlers return `Err` only for failures the client cannot fix (store
//! errors, undecodable bodies); validation failures become 400 responses
//! here, rendered as the form again or as JSON for API clients.

mod auth;
mod notes;
mod recipes;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use tracing::debug;

use crate::config::SessionConfig;
use crate::core::{Request, Response, Result};
use crate::form::FieldError;
use crate::metrics::Metrics;
use crate::server::Handler;
use crate::store::Store;

pub use routes::Route;

/// The pantry web application over a [`Store`] backend.
pub struct App<S: Store> {
    store: Arc<S>,
    session: SessionConfig,
    metrics: Arc<Metrics>,
}

impl<S: Store> App<S> {
    pub fn new(store: Arc<S>, session: SessionConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            session,
            metrics,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn dispatch(&self, req: &Request) -> Result<Response> {
        let route = Route::resolve(req.path());

        if !route.allows(req.method()) {
            let mut res = Response::empty(StatusCode::METHOD_NOT_ALLOWED);
            res.headers_mut()
                .insert(ALLOW, HeaderValue::from_static(route.allow()));
            return Ok(res);
        }

        let post = *req.method() == Method::POST;

        match route {
            Route::Index => self.index(req).await,
            Route::Join if post => self.join_submit(req).await,
            Route::Join => self.join_page(req).await,
            Route::Login if post => self.login_submit(req).await,
            Route::Login => self.login_page(req).await,
            Route::Logout if post => self.logout(req).await,
            Route::Logout => Ok(Response::found("/")),
            Route::Recipes => self.recipe_index(req).await,
            Route::NewRecipe if post => self.recipe_create(req).await,
            Route::NewRecipe => self.recipe_new(req).await,
            Route::Recipe(id) if post => self.recipe_delete(req, id).await,
            Route::Recipe(id) => self.recipe_show(req, id).await,
            Route::Notes => self.note_index(req).await,
            Route::NewNote if post => self.note_create(req).await,
            Route::NewNote => self.note_new(req).await,
            Route::Note(id) if post => self.note_delete(req, id).await,
            Route::Note(id) => self.note_show(req, id).await,
            Route::NotFound => Ok(Response::not_found()),
        }
    }

    /// 400 for a rejected form: JSON for API clients, otherwise the re-rendered page.
    fn rejected(
        &self,
        req: &Request,
        error: &FieldError,
        render: impl FnOnce() -> String,
    ) -> Response {
        debug!(field = %error.field, path = req.path(), "Form rejected");
        self.metrics.record_validation_failure(error.field.as_str());

        if req.wants_json() {
            Response::json(StatusCode::BAD_REQUEST, &error.to_json())
        } else {
            Response::html_with_status(StatusCode::BAD_REQUEST, render())
        }
    }
}

#[async_trait]
impl<S: Store> Handler for App<S> {
    fn name(&self) -> &'static str {
        self.store.name()
    }

    fn route_label(&self, path: &str) -> &'static str {
        Route::resolve(path).label()
    }

    async fn handle(&self, req: Request) -> Result<Response> {
        self.dispatch(&req).await
    }

    async fn ready(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}
