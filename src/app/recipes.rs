use http::StatusCode;
use tracing::info;

use super::App;
use crate::auth::require_user_id;
use crate::core::{Request, Response, Result};
use crate::recipe::{decode_recipe_form, prefill_recipe_form, validate_recipe_form};
use crate::store::Store;
use crate::views;

impl<S: Store> App<S> {
    pub(super) async fn recipe_index(&self, req: &Request) -> Result<Response> {
        let owner = match require_user_id(&*self.store, &self.session, req).await? {
            Ok(id) => id,
            Err(redirect) => return Ok(redirect),
        };

        let recipes = self.store.list_recipes(&owner).await?;
        Ok(Response::html(views::recipe_list(&recipes)))
    }

    /// The form, prefilled from the query string. "Add Ingredient" submits here with GET.
    pub(super) async fn recipe_new(&self, req: &Request) -> Result<Response> {
        if let Err(redirect) = require_user_id(&*self.store, &self.session, req).await? {
            return Ok(redirect);
        }

        let form = prefill_recipe_form(&req.form().await?);
        Ok(Response::html(views::recipe_form(&form, None)))
    }

    pub(super) async fn recipe_create(&self, req: &Request) -> Result<Response> {
        let owner = match require_user_id(&*self.store, &self.session, req).await? {
            Ok(id) => id,
            Err(redirect) => return Ok(redirect),
        };

        let form = decode_recipe_form(&req.form().await?);
        let draft = match validate_recipe_form(&form) {
            Ok(draft) => draft,
            Err(error) => {
                return Ok(self.rejected(req, &error, || views::recipe_form(&form, Some(&error))))
            }
        };

        let recipe = self.store.create_recipe(&owner, &draft).await?;
        self.metrics.recipes_created_total.inc();
        info!(
            recipe_id = %recipe.id,
            ingredients = recipe.ingredients.len(),
            "Recipe created"
        );

        Ok(Response::see_other(&format!("/recipes/{}", recipe.id)))
    }

    pub(super) async fn recipe_show(&self, req: &Request, id: &str) -> Result<Response> {
        let owner = match require_user_id(&*self.store, &self.session, req).await? {
            Ok(id) => id,
            Err(redirect) => return Ok(redirect),
        };

        match self.store.get_recipe(id, &owner).await? {
            Some(recipe) => Ok(Response::html(views::recipe_detail(&recipe))),
            None => Ok(Response::html_with_status(
                StatusCode::NOT_FOUND,
                views::recipe_not_found(),
            )),
        }
    }

    pub(super) async fn recipe_delete(&self, req: &Request, id: &str) -> Result<Response> {
        let owner = match require_user_id(&*self.store, &self.session, req).await? {
            Ok(id) => id,
            Err(redirect) => return Ok(redirect),
        };

        if !self.store.delete_recipe(id, &owner).await? {
            return Ok(Response::html_with_status(
                StatusCode::NOT_FOUND,
                views::recipe_not_found(),
            ));
        }

        info!(recipe_id = id, "Recipe deleted");
        Ok(Response::see_other("/recipes"))
    }
}
