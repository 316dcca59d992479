use http::StatusCode;
use tracing::info;

use super::App;
use crate::auth::require_user_id;
use crate::core::{Request, Response, Result};
use crate::note::validate_note_form;
use crate::store::Store;
use crate::views;

impl<S: Store> App<S> {
    pub(super) async fn note_index(&self, req: &Request) -> Result<Response> {
        let owner = match require_user_id(&*self.store, &self.session, req).await? {
            Ok(id) => id,
            Err(redirect) => return Ok(redirect),
        };

        let notes = self.store.list_notes(&owner).await?;
        Ok(Response::html(views::note_list(&notes)))
    }

    pub(super) async fn note_new(&self, req: &Request) -> Result<Response> {
        if let Err(redirect) = require_user_id(&*self.store, &self.session, req).await? {
            return Ok(redirect);
        }
        Ok(Response::html(views::note_form("", "", None)))
    }

    pub(super) async fn note_create(&self, req: &Request) -> Result<Response> {
        let owner = match require_user_id(&*self.store, &self.session, req).await? {
            Ok(id) => id,
            Err(redirect) => return Ok(redirect),
        };

        let form = req.form().await?;
        let draft = match validate_note_form(&form) {
            Ok(draft) => draft,
            Err(error) => {
                let title = form.get("title").unwrap_or_default();
                let body = form.get("body").unwrap_or_default();
                return Ok(self.rejected(req, &error, || {
                    views::note_form(title, body, Some(&error))
                }));
            }
        };

        let note = self.store.create_note(&owner, &draft).await?;
        self.metrics.notes_created_total.inc();
        info!(note_id = %note.id, "Note created");

        Ok(Response::see_other(&format!("/notes/{}", note.id)))
    }

    pub(super) async fn note_show(&self, req: &Request, id: &str) -> Result<Response> {
        let owner = match require_user_id(&*self.store, &self.session, req).await? {
            Ok(id) => id,
            Err(redirect) => return Ok(redirect),
        };

        match self.store.get_note(id, &owner).await? {
            Some(note) => Ok(Response::html(views::note_detail(&note))),
            None => Ok(Response::html_with_status(
                StatusCode::NOT_FOUND,
                views::note_not_found(),
            )),
        }
    }

    pub(super) async fn note_delete(&self, req: &Request, id: &str) -> Result<Response> {
        let owner = match require_user_id(&*self.store, &self.session, req).await? {
            Ok(id) => id,
            Err(redirect) => return Ok(redirect),
        };

        if !self.store.delete_note(id, &owner).await? {
            return Ok(Response::html_with_status(
                StatusCode::NOT_FOUND,
                views::note_not_found(),
            ));
        }

        info!(note_id = id, "Note deleted");
        Ok(Response::see_other("/notes"))
    }
}
