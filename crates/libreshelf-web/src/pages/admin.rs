use std::rc::Rc;

use dominator::{Dom, clone, events, html, routing, with_node};
use futures_signals::{
    map_ref,
    signal::{Mutable, Signal, SignalExt},
    signal_vec::{MutableVec, SignalVecExt},
};
use gloo_timers::future::TimeoutFuture;
use libreshelf_lib::{
    debounce::Debouncer,
    models::{Book, Category, NewCategory},
    view::UNTITLED,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;

use crate::{
    Context,
    common::Route,
    utils::{self, AsyncLoader},
};

const THUMBNAIL_PLACEHOLDER: &str = "https://placehold.co/50";

pub struct Admin {
    ctx: Rc<Context>,
    books: MutableVec<Book>,
    categories: MutableVec<Category>,
    books_loading: Mutable<bool>,
    search: Mutable<String>,
    category_name: Mutable<String>,
    category_description: Mutable<String>,
    is_creating: Mutable<bool>,
    debouncer: Debouncer,
    books_loader: AsyncLoader,
    categories_loader: AsyncLoader,
}

impl Admin {
    pub fn new(ctx: Rc<Context>) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            books: MutableVec::new(),
            categories: MutableVec::new(),
            books_loading: Mutable::new(false),
            search: Mutable::new(String::new()),
            category_name: Mutable::new(String::new()),
            category_description: Mutable::new(String::new()),
            is_creating: Mutable::new(false),
            debouncer: Debouncer::new(),
            books_loader: AsyncLoader::new(),
            categories_loader: AsyncLoader::new(),
        })
    }

    fn refresh_books(admin: Rc<Self>) {
        admin.books_loading.set(true);
        admin.books_loader.load(clone!(admin => async move {
            let search = admin.search.get_cloned();
            match admin.ctx.library.admin_books(&search).await {
                Ok(books) => admin.books.lock_mut().replace_cloned(books),
                Err(e) => error!("admin books error: {}", e),
            }
            admin.books_loading.set(false);
        }));
    }

    fn refresh_categories(admin: Rc<Self>) {
        admin.categories_loader.load(clone!(admin => async move {
            match admin.ctx.library.categories().await {
                Ok(categories) => admin.categories.lock_mut().replace_cloned(categories),
                Err(e) => error!("admin categories error: {}", e),
            }
        }));
    }

    fn search_debounced(admin: Rc<Self>, text: String) {
        admin.search.set_neq(text.trim().to_string());
        let delay = admin.ctx.config.admin_search_debounce_ms;
        spawn_local(async move {
            if admin.debouncer.settle(TimeoutFuture::new(delay)).await {
                Self::refresh_books(admin);
            }
        });
    }

    fn create_category(admin: Rc<Self>) {
        let name = admin.category_name.get_cloned();
        if name.trim().is_empty() {
            utils::alert("Please enter a category name.");
            return;
        }

        admin.is_creating.set(true);
        spawn_local(clone!(admin => async move {
            let category = NewCategory::new(name.trim(), admin.category_description.get_cloned().trim());
            match admin.ctx.client.create_category(&category).await {
                Ok(_) => {
                    utils::alert("Category created!");
                    admin.category_name.set(String::new());
                    admin.category_description.set(String::new());
                    Self::refresh_categories(admin.clone());
                }
                Err(e) => {
                    error!("error creating category: {}", e);
                    utils::alert(&format!("Failed to create category: {}", e.user_message()));
                }
            }
            admin.is_creating.set(false);
        }));
    }

    fn delete_book(admin: Rc<Self>, book_id: i64) {
        if !utils::confirm(&format!(
            "Are you sure you want to delete Book #{}? This cannot be undone.",
            book_id
        )) {
            return;
        }

        spawn_local(clone!(admin => async move {
            match admin.ctx.client.delete_book(book_id).await {
                Ok(()) => Self::refresh_books(admin.clone()),
                Err(e) => {
                    error!("error deleting book {}: {}", book_id, e);
                    utils::alert("Delete failed.");
                }
            }
        }));
    }

    fn delete_category(admin: Rc<Self>, category_id: i64) {
        if !utils::confirm(&format!("Delete Category #{}?", category_id)) {
            return;
        }

        spawn_local(clone!(admin => async move {
            match admin.ctx.client.delete_category(category_id).await {
                Ok(()) => Self::refresh_categories(admin.clone()),
                Err(e) => {
                    error!("error deleting category {}: {}", category_id, e);
                    utils::alert("Delete failed. (Note: You usually cannot delete categories that contain books)");
                }
            }
        }));
    }

    fn render_stats(admin: &Rc<Self>) -> Dom {
        html!("div", {
            .class("stats")
            .children(&mut [
                html!("div", {
                    .class("stat")
                    .children(&mut [
                        html!("span", {
                            .class("stat-value")
                            .text_signal(admin.books.signal_vec_cloned().len().map(|n| n.to_string()))
                        }),
                        html!("span", {
                            .text("Books")
                        }),
                    ])
                }),
                html!("div", {
                    .class("stat")
                    .children(&mut [
                        html!("span", {
                            .class("stat-value")
                            .text_signal(admin.categories.signal_vec_cloned().len().map(|n| n.to_string()))
                        }),
                        html!("span", {
                            .text("Categories")
                        }),
                    ])
                }),
            ])
        })
    }

    fn render_books(admin: Rc<Self>) -> Dom {
        html!("section", {
            .class("admin-books")
            .children(&mut [
                html!("h2", {
                    .text("Books")
                }),
                html!("input" => HtmlInputElement, {
                    .attr("type", "search")
                    .attr("placeholder", "Search books...")
                    .with_node!(input => {
                        .event(clone!(admin => move |_: events::Input| {
                            Self::search_debounced(admin.clone(), input.value());
                        }))
                    })
                }),
                html!("p", {
                    .visible_signal(admin.books_loading.signal())
                    .text("Loading...")
                }),
                html!("p", {
                    .class("empty")
                    .visible_signal(map_empty(&admin))
                    .text("No books found.")
                }),
                html!("table", {
                    .children(&mut [
                        html!("tbody", {
                            .children_signal_vec(admin.books.signal_vec_cloned().map(clone!(admin => move |book| {
                                let book_id = book.id;
                                let title = book.title.clone().unwrap_or_else(|| UNTITLED.to_string());
                                let author = book.author_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
                                html!("tr", {
                                    .children(&mut [
                                        html!("td", { .class("id").text(&format!("#{}", book_id)) }),
                                        html!("td", {
                                            .children(&mut [
                                                html!("img", {
                                                    .class("thumbnail")
                                                    .attr("src", book.thumbnail.as_deref().filter(|url| !url.is_empty()).unwrap_or(THUMBNAIL_PLACEHOLDER))
                                                })
                                            ])
                                        }),
                                        html!("td", { .attr("title", &title).text(&title) }),
                                        html!("td", { .text(&format!("User ID: {}", author)) }),
                                        html!("td", {
                                            .children(&mut [
                                                html!("button", {
                                                    .class("danger")
                                                    .attr("title", "Delete")
                                                    .text("Delete")
                                                    .event(clone!(admin => move |_: events::Click| {
                                                        Self::delete_book(admin.clone(), book_id);
                                                    }))
                                                })
                                            ])
                                        }),
                                    ])
                                })
                            })))
                        })
                    ])
                }),
            ])
        })
    }

    fn render_categories(admin: Rc<Self>) -> Dom {
        html!("section", {
            .class("admin-categories")
            .children(&mut [
                html!("h2", {
                    .text("Categories")
                }),
                html!("div", {
                    .class("category-form")
                    .children(&mut [
                        html!("input" => HtmlInputElement, {
                            .attr("type", "text")
                            .attr("placeholder", "Name")
                            .prop_signal("value", admin.category_name.signal_cloned())
                            .with_node!(input => {
                                .event(clone!(admin => move |_: events::Input| {
                                    admin.category_name.set_neq(input.value());
                                }))
                            })
                        }),
                        html!("input" => HtmlInputElement, {
                            .attr("type", "text")
                            .attr("placeholder", "Description")
                            .prop_signal("value", admin.category_description.signal_cloned())
                            .with_node!(input => {
                                .event(clone!(admin => move |_: events::Input| {
                                    admin.category_description.set_neq(input.value());
                                }))
                            })
                        }),
                        html!("button", {
                            .class("primary")
                            .prop_signal("disabled", admin.is_creating.signal())
                            .text_signal(admin.is_creating.signal().map(|creating| {
                                if creating { "Creating..." } else { "Create Category" }
                            }))
                            .event(clone!(admin => move |_: events::Click| {
                                Self::create_category(admin.clone());
                            }))
                        }),
                    ])
                }),
                html!("table", {
                    .children(&mut [
                        html!("tbody", {
                            .children_signal_vec(admin.categories.signal_vec_cloned().map(clone!(admin => move |category| {
                                let category_id = category.id;
                                html!("tr", {
                                    .children(&mut [
                                        html!("td", { .class("id").text(&format!("#{}", category_id)) }),
                                        html!("td", { .text(&category.name) }),
                                        html!("td", {
                                            .text(category.description.as_deref().filter(|d| !d.is_empty()).unwrap_or("-"))
                                        }),
                                        html!("td", {
                                            .children(&mut [
                                                html!("button", {
                                                    .class("danger")
                                                    .text("Delete")
                                                    .event(clone!(admin => move |_: events::Click| {
                                                        Self::delete_category(admin.clone(), category_id);
                                                    }))
                                                })
                                            ])
                                        }),
                                    ])
                                })
                            })))
                        })
                    ])
                }),
            ])
        })
    }

    pub fn render(admin: Rc<Self>) -> Dom {
        Self::refresh_books(admin.clone());
        Self::refresh_categories(admin.clone());

        html!("div", {
            .class("content")
            .class("admin")
            .children(&mut [
                html!("div", {
                    .class("admin-header")
                    .children(&mut [
                        html!("h1", {
                            .text("Admin Panel")
                        }),
                        html!("button", {
                            .text("Logout")
                            .event(clone!(admin => move |_: events::Click| {
                                admin.ctx.auth.logout();
                                routing::go_to_url(&Route::SignIn.url());
                            }))
                        }),
                    ])
                }),
                Self::render_stats(&admin),
                Self::render_books(admin.clone()),
                Self::render_categories(admin),
            ])
        })
    }
}

/// Shows the empty message only once a load has finished.
fn map_empty(admin: &Admin) -> impl Signal<Item = bool> + use<> {
    map_ref! {
        let is_empty = admin.books.signal_vec_cloned().is_empty(),
        let loading = admin.books_loading.signal() =>
        *is_empty && !*loading
    }
}
