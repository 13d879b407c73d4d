#[macro_use]
extern crate log;

mod app;
mod common;
mod pages;
mod utils;

use std::rc::Rc;

use libreshelf_lib::context::AppContext;
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::MediaQueryListEvent;

use app::App;
use utils::{BrowserStorage, window};

pub(crate) type Context = AppContext;

#[wasm_bindgen(start)]
pub async fn main_js() -> Result<(), JsValue> {
    #[cfg(debug_assertions)]
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let config = utils::load_config();
    info!("api at {}", config.api_base_url);

    utils::apply_theme();

    // A stored preference wins over the system one, apply_theme checks both.
    let closure = Closure::wrap(Box::new(|_: MediaQueryListEvent| {
        utils::apply_theme();
    }) as Box<dyn FnMut(_)>);

    if let Ok(Some(media_query_list)) = window().match_media("(prefers-color-scheme: dark)") {
        media_query_list.set_onchange(Some(closure.as_ref().unchecked_ref()))
    }

    closure.forget();

    let ctx = AppContext::new(config, Rc::new(BrowserStorage));
    dominator::append_dom(&dominator::body(), App::render(App::new(ctx)));

    Ok(())
}
