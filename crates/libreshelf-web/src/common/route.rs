use dominator::routing;
use futures_signals::signal::{Signal, SignalExt};
use wasm_bindgen::prelude::*;
use web_sys::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Catalog {
        search: Option<String>,
        category: Option<i64>,
    },
    /// `None` when the page was opened without an `id`.
    Detail(Option<i64>),
    Upload { edit: Option<i64> },
    Dashboard,
    Admin,
    SignIn,
    SignUp,
    NotFound,
}

fn param<T: std::str::FromStr>(url: &Url, name: &str) -> Option<T> {
    url.search_params().get(name).and_then(|v| v.parse().ok())
}

impl Route {
    pub fn signal() -> impl Signal<Item = Self> {
        routing::url()
            .signal_ref(|url| Url::new(url).unwrap_throw())
            .map(|url| {
                let pathname = url.pathname();
                let mut paths = pathname.split('/').collect::<Vec<_>>();
                paths.retain(|path| !path.is_empty());

                match paths.as_slice() {
                    [] | ["index.html"] => Route::Home,
                    ["categories"] => Route::Catalog {
                        search: url.search_params().get("search").filter(|s| !s.is_empty()),
                        category: param(&url, "category_id"),
                    },
                    ["detail"] => Route::Detail(param(&url, "id")),
                    ["upload"] => Route::Upload {
                        edit: param(&url, "edit"),
                    },
                    ["dashboard"] => Route::Dashboard,
                    ["admin"] => Route::Admin,
                    ["signin"] => Route::SignIn,
                    ["signup"] => Route::SignUp,
                    _ => Route::NotFound,
                }
            })
    }

    pub fn url(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Catalog { search, category } => {
                let mut params = vec![];
                if let Some(search) = search {
                    params.push(format!(
                        "search={}",
                        String::from(js_sys::encode_uri_component(search))
                    ));
                }
                if let Some(category) = category {
                    params.push(format!("category_id={}", category));
                }
                if params.is_empty() {
                    "/categories".to_string()
                } else {
                    format!("/categories?{}", params.join("&"))
                }
            }
            Route::Detail(Some(id)) => format!("/detail?id={}", id),
            Route::Detail(None) => "/detail".to_string(),
            Route::Upload { edit: Some(id) } => format!("/upload?edit={}", id),
            Route::Upload { edit: None } => "/upload".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::SignIn => "/signin".to_string(),
            Route::SignUp => "/signup".to_string(),
            Route::NotFound => "/notfound".to_string(),
        }
    }
}
