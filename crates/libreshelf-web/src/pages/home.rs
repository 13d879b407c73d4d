use std::rc::Rc;

use dominator::{Dom, clone, html, link};
use futures_signals::signal::{Mutable, SignalExt};
use libreshelf_lib::{models::Book, view::BookCard};

use crate::{
    Context,
    common::{Route, Spinner, book_card},
    utils::AsyncLoader,
};

/// `None` while loading, `Err` holds the message to show in place.
type Section = Mutable<Option<Result<Vec<BookCard>, String>>>;

pub struct Home {
    ctx: Rc<Context>,
    new_releases: Section,
    popular: Section,
    loader: AsyncLoader,
}

impl Home {
    pub fn new(ctx: Rc<Context>) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            new_releases: Mutable::new(None),
            popular: Mutable::new(None),
            loader: AsyncLoader::new(),
        })
    }

    fn cards(&self, result: libreshelf_lib::Result<Vec<Book>>) -> Result<Vec<BookCard>, String> {
        let placeholder = &self.ctx.config.placeholder_cover;
        result
            .map(|books| {
                books
                    .iter()
                    .map(|book| BookCard::new(book, placeholder))
                    .collect()
            })
            .map_err(|e| {
                error!("error loading books: {}", e);
                e.user_message()
            })
    }

    fn fetch(home: Rc<Self>) {
        home.loader.load(clone!(home => async move {
            let library = home.ctx.library.clone();
            let (new_releases, popular) = futures::join!(library.new_releases(), library.popular());
            home.new_releases.set(Some(home.cards(new_releases)));
            home.popular.set(Some(home.cards(popular)));
        }));
    }

    fn render_section(title: &str, id: &str, empty: &'static str, section: &Section) -> Dom {
        html!("section", {
            .class("book-section")
            .attr("id", id)
            .children(&mut [
                html!("h2", {
                    .text(title)
                })
            ])
            .child_signal(section.signal_cloned().map(move |state| Some(match state {
                None => Spinner::render(),
                Some(Ok(cards)) if cards.is_empty() => html!("p", {
                    .class("empty")
                    .text(empty)
                }),
                Some(Ok(cards)) => html!("div", {
                    .class("book-grid")
                    .children(cards.iter().map(book_card::render))
                }),
                Some(Err(message)) => html!("p", {
                    .class("error")
                    .text(&message)
                }),
            })))
        })
    }

    pub fn render(home: Rc<Self>) -> Dom {
        Self::fetch(home.clone());

        html!("div", {
            .class("content")
            .children(&mut [
                html!("header", {
                    .class("hero")
                    .children(&mut [
                        html!("h1", {
                            .text("Read, share and learn for free")
                        }),
                        link!(Route::Catalog { search: None, category: None }.url(), {
                            .class("button")
                            .text("Browse the library")
                        }),
                    ])
                }),
                Self::render_section("New Releases", "new-releases", "No new releases.", &home.new_releases),
                Self::render_section("Popular Books", "popular", "No popular books found.", &home.popular),
            ])
        })
    }
}
