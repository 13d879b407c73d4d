use std::rc::Rc;

use dominator::{Dom, clone, events, html, link, with_node};
use futures_signals::signal::{Mutable, SignalExt};
use libreshelf_lib::{
    Error,
    view::{BookDetail, UNAVAILABLE},
};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlTextAreaElement;

use crate::{
    Context,
    common::{Route, Spinner, snackbar},
    utils::AsyncLoader,
};

#[derive(Clone)]
enum State {
    Loading,
    Loaded(Rc<BookDetail>),
    NotFound,
    Failed(String),
}

pub struct Detail {
    ctx: Rc<Context>,
    book_id: i64,
    state: Mutable<State>,
    is_favorite: Mutable<bool>,
    is_toggling: Mutable<bool>,
    report_reason: Mutable<String>,
    loader: AsyncLoader,
}

impl Detail {
    pub fn new(ctx: Rc<Context>, book_id: i64) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            book_id,
            state: Mutable::new(State::Loading),
            is_favorite: Mutable::new(false),
            is_toggling: Mutable::new(false),
            report_reason: Mutable::new(String::new()),
            loader: AsyncLoader::new(),
        })
    }

    fn fetch(detail: Rc<Self>) {
        detail.loader.load(clone!(detail => async move {
            let state = match detail.ctx.client.book(detail.book_id).await {
                Ok(book) => State::Loaded(Rc::new(BookDetail::new(&book, &detail.ctx.config.placeholder_cover))),
                Err(Error::Http { status: 404, .. }) => State::NotFound,
                Err(e) => {
                    error!("error loading book {}: {}", detail.book_id, e);
                    State::Failed(e.user_message())
                }
            };
            detail.state.set(state);

            match detail.ctx.favorites.is_favorite(detail.book_id).await {
                Ok(is_favorite) => detail.is_favorite.set_neq(is_favorite),
                Err(e) => warn!("error checking favorite: {}", e),
            }
        }));
    }

    fn toggle_favorite(detail: Rc<Self>) {
        if detail.is_toggling.replace(true) {
            return;
        }

        spawn_local(clone!(detail => async move {
            match detail.ctx.favorites.toggle(detail.book_id, detail.is_favorite.get()).await {
                Ok(is_favorite) => detail.is_favorite.set_neq(is_favorite),
                Err(e) => snackbar::show_error("error toggling favorite", &e),
            }
            detail.is_toggling.set(false);
        }));
    }

    fn report(detail: Rc<Self>) {
        let reason = detail.report_reason.get_cloned();
        if reason.trim().is_empty() {
            snackbar::show("Please describe the problem.".to_string());
            return;
        }

        spawn_local(clone!(detail => async move {
            match detail.ctx.client.report(detail.book_id, reason.trim()).await {
                Ok(()) => {
                    detail.report_reason.set(String::new());
                    snackbar::show("Report submitted. Thank you!".to_string());
                }
                Err(e) => snackbar::show_error("error reporting book", &e),
            }
        }));
    }

    fn render_download(book: &BookDetail) -> Dom {
        match &book.file_url {
            Some(url) => html!("a", {
                .class("button")
                .attr("href", url)
                .attr("target", "_blank")
                .text("Download")
            }),
            None => html!("span", {
                .class(["button", "disabled"])
                .text(UNAVAILABLE)
            }),
        }
    }

    fn render_viewer(book: &BookDetail) -> Option<Dom> {
        let url = book.file_url.as_deref()?;
        Some(if book.is_pdf() {
            html!("iframe", {
                .class("pdf-viewer")
                .attr("src", url)
                .attr("title", &book.title)
            })
        } else {
            html!("p", {
                .class("pdf-fallback")
                .text("Preview is only available for PDF documents.")
            })
        })
    }

    fn render_report(detail: Rc<Self>) -> Dom {
        html!("div", {
            .class("report")
            .children(&mut [
                html!("h3", {
                    .text("Report a problem")
                }),
                html!("textarea" => HtmlTextAreaElement, {
                    .attr("placeholder", "What is wrong with this book?")
                    .prop_signal("value", detail.report_reason.signal_cloned())
                    .with_node!(input => {
                        .event(clone!(detail => move |_: events::Input| {
                            detail.report_reason.set_neq(input.value());
                        }))
                    })
                }),
                html!("button", {
                    .text("Send report")
                    .event(clone!(detail => move |_: events::Click| {
                        Self::report(detail.clone());
                    }))
                }),
            ])
        })
    }

    fn render_book(detail: &Rc<Self>, book: &BookDetail) -> Dom {
        html!("article", {
            .class("book-detail")
            .children(&mut [
                html!("img", {
                    .class("book-cover")
                    .attr("src", &book.cover_url)
                    .attr("alt", &book.title)
                }),
                html!("div", {
                    .class("book-info")
                    .children(&mut [
                        html!("h1", {
                            .text(&book.title)
                        }),
                        html!("p", {
                            .class("book-author")
                            .text(&book.author)
                        }),
                        html!("div", {
                            .class("badges")
                            .children(book.categories.iter().map(|name| html!("span", {
                                .class("badge")
                                .text(name)
                            })))
                        }),
                        html!("p", {
                            .class("book-description")
                            .text(&book.description)
                        }),
                        html!("div", {
                            .class("actions")
                            .children(&mut [
                                Self::render_download(book),
                                html!("button", {
                                    .class("favorite")
                                    .class_signal("active", detail.is_favorite.signal())
                                    .text_signal(detail.is_favorite.signal().map(|is_favorite| {
                                        if is_favorite { "Saved" } else { "Favorite" }
                                    }))
                                    .event(clone!(detail => move |_: events::Click| {
                                        Self::toggle_favorite(detail.clone());
                                    }))
                                }),
                            ])
                        }),
                    ])
                }),
            ])
            .children(Self::render_viewer(book))
            .child(Self::render_report(detail.clone()))
        })
    }

    pub fn render(detail: Rc<Self>) -> Dom {
        Self::fetch(detail.clone());

        html!("div", {
            .class("content")
            .child_signal(detail.state.signal_cloned().map(clone!(detail => move |state| Some(match state {
                State::Loading => Spinner::render(),
                State::Loaded(book) => Self::render_book(&detail, &book),
                State::NotFound => html!("div", {
                    .class("not-found")
                    .children(&mut [
                        html!("h2", {
                            .text("Book not found")
                        }),
                        link!(Route::Catalog { search: None, category: None }.url(), {
                            .text("Back to the library")
                        }),
                    ])
                }),
                State::Failed(message) => html!("p", {
                    .class("error")
                    .text(&message)
                }),
            }))))
        })
    }
}
