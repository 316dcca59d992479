//! Route table.

use http::Method;

/// A resolved request path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Index,
    Join,
    Login,
    Logout,
    Recipes,
    NewRecipe,
    Recipe(&'a str),
    Notes,
    NewNote,
    Note(&'a str),
    NotFound,
}

impl<'a> Route<'a> {
    /// Match a URI path. A single trailing slash is ignored.
    pub fn resolve(path: &'a str) -> Self {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };

        match path {
            "/" => Route::Index,
            "/join" => Route::Join,
            "/login" => Route::Login,
            "/logout" => Route::Logout,
            "/recipes" => Route::Recipes,
            "/recipes/new" => Route::NewRecipe,
            "/notes" => Route::Notes,
            "/notes/new" => Route::NewNote,
            _ => {
                if let Some(id) = single_segment(path, "/recipes/") {
                    Route::Recipe(id)
                } else if let Some(id) = single_segment(path, "/notes/") {
                    Route::Note(id)
                } else {
                    Route::NotFound
                }
            }
        }
    }

    /// Stable label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Index => "index",
            Route::Join => "join",
            Route::Login => "login",
            Route::Logout => "logout",
            Route::Recipes => "recipes",
            Route::NewRecipe => "recipes_new",
            Route::Recipe(_) => "recipe",
            Route::Notes => "notes",
            Route::NewNote => "notes_new",
            Route::Note(_) => "note",
            Route::NotFound => "not_found",
        }
    }

    /// Whether POST is served on this path.
    pub fn accepts_post(&self) -> bool {
        !matches!(
            self,
            Route::Index | Route::Recipes | Route::Notes | Route::NotFound
        )
    }

    /// Value for the `Allow` header.
    pub fn allow(&self) -> &'static str {
        if self.accepts_post() {
            "GET, HEAD, POST"
        } else {
            "GET, HEAD"
        }
    }

    /// Unknown paths take every method so they answer 404, not 405.
    pub fn allows(&self, method: &Method) -> bool {
        if matches!(self, Route::NotFound) {
            return true;
        }
        match *method {
            Method::GET | Method::HEAD => true,
            Method::POST => self.accepts_post(),
            _ => false,
        }
    }
}

/// `"abc"` for `"/recipes/abc"`; nothing when empty or nested deeper.
fn single_segment<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}
