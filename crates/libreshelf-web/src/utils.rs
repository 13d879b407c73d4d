use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use futures::{
    Future,
    future::{AbortHandle, abortable},
};
use futures_signals::signal::Mutable;
use libreshelf_lib::{api::FilePart, config::Config, storage::KeyValueStore, theme::ThemePreference};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, File, HtmlElement, Storage, Window};

const CONFIG_GLOBAL: &str = "__LIBRESHELF_CONFIG__";

thread_local! {
    static WINDOW: Window = web_sys::window().unwrap_throw();
    static DOCUMENT: Document = WINDOW.with(|w| w.document().unwrap_throw());
    static BODY: HtmlElement = DOCUMENT.with(|d| d.body().unwrap_throw());
    static LOCAL_STORAGE: Storage = WINDOW.with(|w| w.local_storage().unwrap_throw().unwrap_throw());
}

struct AsyncState {
    id: usize,
    handle: AbortHandle,
}

impl AsyncState {
    fn new(handle: AbortHandle) -> Self {
        static ID: AtomicUsize = AtomicUsize::new(0);
        let id = ID.fetch_add(1, Ordering::SeqCst);

        Self { id, handle }
    }
}

/// Runs one background task per owner; starting a new one aborts the old.
pub struct AsyncLoader {
    loading: Mutable<Option<AsyncState>>,
}

impl Default for AsyncLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncLoader {
    pub fn new() -> Self {
        Self {
            loading: Mutable::new(None),
        }
    }

    fn replace(&self, value: Option<AsyncState>) {
        let mut loading = self.loading.lock_mut();
        if let Some(state) = loading.as_mut() {
            state.handle.abort();
        }
        *loading = value;
    }

    pub fn load<F>(&self, fut: F)
    where
        F: Future<Output = ()> + 'static,
    {
        let (fut, handle) = abortable(fut);

        let state = AsyncState::new(handle);
        let id = state.id;

        self.replace(Some(state));

        let loading = self.loading.clone();

        spawn_local(async move {
            match fut.await {
                Ok(()) => {
                    let mut loading = loading.lock_mut();

                    if loading.as_ref().map(|x| x.id) == Some(id) {
                        *loading = None;
                    }
                }
                Err(_) => {
                    debug!("task {} aborted", id);
                }
            }
        });
    }
}

/// `window.localStorage` behind the store trait the session uses.
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = local_storage().set_item(key, value) {
            error!("failed to store {}: {:?}", key, e);
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = local_storage().remove_item(key) {
            error!("failed to remove {}: {:?}", key, e);
        }
    }
}

pub fn load_config() -> Config {
    let value = js_sys::Reflect::get(&window(), &JsValue::from_str(CONFIG_GLOBAL))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null());

    let json = value.and_then(|value| {
        js_sys::JSON::stringify(&value)
            .ok()
            .and_then(|json| json.as_string())
    });

    Config::load(json.as_deref())
}

pub fn prefers_dark() -> bool {
    window()
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .map(|m| m.matches())
        .unwrap_or(false)
}

pub fn is_dark() -> bool {
    body().class_list().contains("dark")
}

pub fn apply_theme() {
    let storage = BrowserStorage;
    let dark = ThemePreference::new(&storage).is_dark(prefers_dark());
    set_dark(dark);
}

pub fn set_dark(dark: bool) {
    let class_list = body().class_list();
    let result = if dark {
        class_list.add_1("dark")
    } else {
        class_list.remove_1("dark")
    };
    if let Err(e) = result {
        error!("failed to apply theme: {:?}", e);
    }
}

pub fn alert(message: &str) {
    if let Err(e) = window().alert_with_message(message) {
        error!("failed to alert: {:?}", e);
    }
}

pub fn confirm(message: &str) -> bool {
    window().confirm_with_message(message).unwrap_or(false)
}

pub async fn read_file(file: &File) -> Result<FilePart, anyhow::Error> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| anyhow!("error reading {}: {:?}", file.name(), e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    let part = FilePart::new(file.name(), bytes);
    let mime = file.type_();
    Ok(if mime.is_empty() {
        part
    } else {
        part.with_mime(mime)
    })
}

pub fn window() -> Window {
    WINDOW.with(|s| s.clone())
}

pub fn local_storage() -> Storage {
    LOCAL_STORAGE.with(|s| s.clone())
}

pub fn body() -> HtmlElement {
    BODY.with(|d| d.clone())
}
