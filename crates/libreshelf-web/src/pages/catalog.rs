use std::{cell::RefCell, rc::Rc};

use dominator::{Dom, EventOptions, clone, events, html, with_node};
use futures_signals::{
    map_ref,
    signal::{Mutable, SignalExt},
    signal_vec::SignalVecExt,
};
use gloo_timers::future::TimeoutFuture;
use libreshelf_lib::{
    api::ApiClient,
    catalog::CatalogController,
    models::Category,
    view::{self, BookCard},
};
use wasm_bindgen::{JsCast, prelude::*};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, HtmlInputElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use crate::{
    Context,
    common::{Spinner, book_card},
    utils::AsyncLoader,
};

const SENTINEL_MARGIN: &str = "200px";

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

pub struct Catalog {
    ctx: Rc<Context>,
    controller: Rc<CatalogController<Rc<ApiClient>>>,
    categories: Mutable<Option<Result<Vec<Category>, String>>>,
    search_input: Mutable<String>,
    initial_search: Option<String>,
    initial_category: Option<i64>,
    observer: RefCell<Option<(IntersectionObserver, ObserverCallback)>>,
    loader: AsyncLoader,
}

impl Catalog {
    pub fn new(ctx: Rc<Context>, search: Option<String>, category: Option<i64>) -> Rc<Self> {
        Rc::new(Self {
            controller: Rc::new(ctx.catalog()),
            ctx,
            categories: Mutable::new(None),
            search_input: Mutable::new(search.clone().unwrap_or_default()),
            initial_search: search,
            initial_category: category,
            observer: RefCell::new(None),
            loader: AsyncLoader::new(),
        })
    }

    fn fetch_categories(catalog: Rc<Self>) {
        catalog.loader.load(clone!(catalog => async move {
            match catalog.ctx.client.categories().await {
                Ok(categories) => catalog.categories.set(Some(Ok(categories))),
                Err(e) => {
                    error!("error loading categories: {}", e);
                    catalog.categories.set(Some(Err("Error loading categories.".to_string())));
                }
            }
        }));
    }

    fn reset(&self, search: Option<String>, category: Option<Option<i64>>) {
        let controller = self.controller.clone();
        spawn_local(async move {
            controller.reset(search, category).await;
        });
    }

    fn search_debounced(&self, text: String) {
        let controller = self.controller.clone();
        let delay = self.ctx.config.search_debounce_ms;
        spawn_local(async move {
            controller
                .search_debounced(text, TimeoutFuture::new(delay))
                .await;
        });
    }

    fn search_now(&self) {
        let controller = self.controller.clone();
        let text = self.search_input.get_cloned();
        spawn_local(async move {
            controller.search_now(text).await;
        });
    }

    fn set_category(&self, category: Option<i64>) {
        let controller = self.controller.clone();
        spawn_local(async move {
            controller.set_category(category).await;
        });
    }

    fn load_next(&self) {
        let controller = self.controller.clone();
        spawn_local(async move {
            controller.load_next().await;
        });
    }

    fn observe_sentinel(catalog: &Rc<Self>, sentinel: &Element) -> Result<(), JsValue> {
        let callback: ObserverCallback = Closure::wrap(Box::new(clone!(catalog => move |entries: js_sys::Array, _: IntersectionObserver| {
            let visible = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .any(|entry| entry.is_intersecting());

            let controller = catalog.controller.clone();
            spawn_local(async move {
                controller.sentinel_changed(visible).await;
            });
        })) as Box<dyn FnMut(_, _)>);

        let init = IntersectionObserverInit::new();
        init.set_root_margin(SENTINEL_MARGIN);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        observer.observe(sentinel);

        catalog.observer.replace(Some((observer, callback)));
        Ok(())
    }

    fn disconnect(&self) {
        if let Some((observer, _)) = self.observer.take() {
            observer.disconnect();
        }
    }

    fn render_search(catalog: Rc<Self>) -> Dom {
        html!("div", {
            .class("search-bar")
            .children(&mut [
                html!("input" => HtmlInputElement, {
                    .attr("type", "search")
                    .attr("placeholder", "Search by title or author...")
                    .prop_signal("value", catalog.search_input.signal_cloned())
                    .with_node!(input => {
                        .event(clone!(catalog => move |_: events::Input| {
                            let value = input.value();
                            catalog.search_input.set_neq(value.clone());
                            catalog.search_debounced(value);
                        }))
                    })
                    .event_with_options(&EventOptions::preventable(), clone!(catalog => move |e: events::KeyDown| {
                        if e.key() == "Enter" {
                            e.prevent_default();
                            catalog.search_now();
                        }
                    }))
                }),
                html!("button", {
                    .text("Search")
                    .event(clone!(catalog => move |_: events::Click| {
                        catalog.search_now();
                    }))
                }),
            ])
        })
    }

    fn render_sidebar(catalog: Rc<Self>) -> Dom {
        let controller = catalog.controller.clone();
        html!("aside", {
            .class("category-sidebar")
            .children(&mut [
                html!("h3", {
                    .text("Categories")
                }),
                html!("button", {
                    .class("clear-filter")
                    .text("Clear filter")
                    .visible_signal(controller.category_signal().map(|category| category.is_some()))
                    .event(clone!(catalog => move |_: events::Click| {
                        catalog.set_category(None);
                    }))
                }),
            ])
            .child_signal(catalog.categories.signal_cloned().map(clone!(catalog => move |categories| Some(match categories {
                None => Spinner::render(),
                Some(Err(message)) => html!("p", {
                    .class("error")
                    .text(&message)
                }),
                Some(Ok(categories)) if categories.is_empty() => html!("p", {
                    .class("empty")
                    .text("No categories found.")
                }),
                Some(Ok(categories)) => html!("ul", {
                    .class("category-list")
                    .children(categories.into_iter().map(|category| {
                        let id = category.id;
                        html!("li", {
                            .children(&mut [
                                html!("label", {
                                    .children(&mut [
                                        html!("input", {
                                            .attr("type", "radio")
                                            .attr("name", "category")
                                            .attr("value", &id.to_string())
                                            .prop_signal("checked", catalog.controller.category_signal().map(move |current| current == Some(id)))
                                            .event(clone!(catalog => move |_: events::Change| {
                                                catalog.set_category(Some(id));
                                            }))
                                        }),
                                        html!("span", {
                                            .text(&category.name)
                                        }),
                                    ])
                                })
                            ])
                        })
                    }))
                }),
            }))))
        })
    }

    fn render_results(catalog: Rc<Self>) -> Dom {
        let controller = catalog.controller.clone();
        let placeholder = catalog.ctx.config.placeholder_cover.clone();

        let count = map_ref! {
            let total = controller.total_signal(),
            let loaded = controller.books().signal_vec_cloned().len() =>
            view::result_count(*total, *loaded)
        };

        html!("section", {
            .class("catalog-results")
            .children(&mut [
                html!("p", {
                    .class("result-count")
                    .text_signal(count)
                }),
                html!("div", {
                    .class("book-grid")
                    .children_signal_vec(controller.books().signal_vec_cloned().map(move |book| {
                        book_card::render(&BookCard::new(&book, &placeholder))
                    }))
                }),
                html!("p", {
                    .class("empty")
                    .visible_signal(controller.is_empty_signal())
                    .text("No books found.")
                }),
            ])
            .child_signal(controller.error_signal().map(clone!(catalog => move |error| {
                error.map(|error| html!("div", {
                    .class("error")
                    .children(&mut [
                        html!("span", {
                            .text(&error.user_message())
                        }),
                        html!("button", {
                            .text("Retry")
                            .event(clone!(catalog => move |_: events::Click| {
                                catalog.load_next();
                            }))
                        }),
                    ])
                }))
            })))
            .children(&mut [
                Spinner::render_signal(controller.is_loading_signal()),
                html!("div" => Element, {
                    .class("sentinel")
                    .with_node!(sentinel => {
                        .after_inserted(clone!(catalog => move |_| {
                            if let Err(e) = Self::observe_sentinel(&catalog, &sentinel) {
                                error!("error observing sentinel: {:?}", e);
                            }
                        }))
                    })
                    .after_removed(clone!(catalog => move |_| {
                        catalog.disconnect();
                    }))
                }),
            ])
        })
    }

    pub fn render(catalog: Rc<Self>) -> Dom {
        Self::fetch_categories(catalog.clone());
        catalog.reset(catalog.initial_search.clone(), Some(catalog.initial_category));

        html!("div", {
            .class("content")
            .class("catalog")
            .children(&mut [
                Self::render_search(catalog.clone()),
                html!("div", {
                    .class("catalog-body")
                    .children(&mut [
                        Self::render_sidebar(catalog.clone()),
                        Self::render_results(catalog),
                    ])
                }),
            ])
        })
    }
}
