use std::rc::Rc;

use dominator::{Dom, clone, events, html, link, routing, with_node};
use futures_signals::{
    signal::{Mutable, SignalExt},
    signal_vec::{MutableVec, SignalVecExt},
};
use libreshelf_lib::{
    models::{Book, Profile, ProfileUpdate},
    view::BookCard,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

use crate::{
    Context,
    common::{Route, Spinner},
    utils::{self, AsyncLoader},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Profile,
    MyBooks,
    Bookmarks,
}

impl Tab {
    fn label(&self) -> &'static str {
        match self {
            Tab::Profile => "Profile",
            Tab::MyBooks => "My Books",
            Tab::Bookmarks => "Bookmarks",
        }
    }
}

pub struct Dashboard {
    ctx: Rc<Context>,
    tab: Mutable<Tab>,
    profile: Mutable<Option<Profile>>,
    update: Mutable<ProfileUpdate>,
    my_books: MutableVec<Book>,
    bookmarks: MutableVec<Book>,
    is_loading: Mutable<bool>,
    loader: AsyncLoader,
}

impl Dashboard {
    pub fn new(ctx: Rc<Context>) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            tab: Mutable::new(Tab::Profile),
            profile: Mutable::new(None),
            update: Mutable::new(ProfileUpdate::default()),
            my_books: MutableVec::new(),
            bookmarks: MutableVec::new(),
            is_loading: Mutable::new(true),
            loader: AsyncLoader::new(),
        })
    }

    fn fetch(dashboard: Rc<Self>) {
        dashboard.loader.load(clone!(dashboard => async move {
            let profile = match dashboard.ctx.auth.refresh_profile().await {
                Ok(profile) => profile,
                Err(e) => {
                    error!("error loading profile: {}", e);
                    routing::go_to_url(&Route::SignIn.url());
                    return;
                }
            };
            dashboard.update.set(ProfileUpdate::from_profile(&profile));
            dashboard.profile.set(Some(profile));

            let library = dashboard.ctx.library.clone();
            let (my_books, bookmarks) = futures::join!(library.my_books(), dashboard.ctx.client.bookmarks());
            match my_books {
                Ok(books) => dashboard.my_books.lock_mut().replace_cloned(books),
                Err(e) => error!("error loading my books: {}", e),
            }
            match bookmarks {
                Ok(books) => dashboard.bookmarks.lock_mut().replace_cloned(books),
                Err(e) => error!("error loading bookmarks: {}", e),
            }
            dashboard.is_loading.set(false);
        }));
    }

    fn save_profile(dashboard: Rc<Self>) {
        spawn_local(clone!(dashboard => async move {
            let update = dashboard.update.get_cloned();
            match dashboard.ctx.library.save_profile(&update).await {
                Ok(()) => utils::alert("Profile updated successfully!"),
                Err(e) => {
                    error!("error updating profile: {}", e);
                    utils::alert("Error updating profile.");
                }
            }
        }));
    }

    fn upload_avatar(dashboard: Rc<Self>, input: HtmlInputElement) {
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };

        spawn_local(clone!(dashboard => async move {
            let part = match utils::read_file(&file).await {
                Ok(part) => part,
                Err(e) => {
                    error!("{}", e);
                    utils::alert("Failed to upload profile picture.");
                    return;
                }
            };

            let result = match dashboard.ctx.client.upload_file(part).await {
                Ok(url) => {
                    dashboard.update.lock_mut().profile_url = url;
                    let update = dashboard.update.get_cloned();
                    dashboard.ctx.library.save_profile(&update).await
                }
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                error!("error uploading avatar: {}", e);
                utils::alert("Failed to upload profile picture.");
            }
        }));
    }

    fn delete_book(dashboard: Rc<Self>, book_id: i64) {
        if !utils::confirm("Permanently delete this book?") {
            return;
        }

        spawn_local(clone!(dashboard => async move {
            match dashboard.ctx.client.delete_book(book_id).await {
                Ok(()) => dashboard.my_books.lock_mut().retain(|book| book.id != book_id),
                Err(e) => {
                    error!("error deleting book {}: {}", book_id, e);
                    utils::alert("Failed to delete.");
                }
            }
        }));
    }

    fn remove_bookmark(dashboard: Rc<Self>, book_id: i64) {
        if !utils::confirm("Remove?") {
            return;
        }

        spawn_local(clone!(dashboard => async move {
            match dashboard.ctx.client.remove_bookmark(book_id).await {
                Ok(()) => dashboard.bookmarks.lock_mut().retain(|book| book.id != book_id),
                Err(e) => {
                    error!("error removing bookmark {}: {}", book_id, e);
                    utils::alert("Failed.");
                }
            }
        }));
    }

    fn render_sidebar(dashboard: Rc<Self>) -> Dom {
        html!("aside", {
            .class("dashboard-sidebar")
            .child_signal(dashboard.profile.signal_cloned().map(|profile| profile.map(|profile| html!("div", {
                .class("profile-summary")
                .children(&mut [
                    html!("img", {
                        .class("avatar")
                        .attr("src", profile.avatar_url())
                        .attr("alt", profile.display_name())
                    }),
                    html!("h2", {
                        .text(profile.display_name())
                    }),
                    html!("span", {
                        .class("role")
                        .text(profile.role.dashboard_label())
                    }),
                ])
            }))))
            .children([Tab::Profile, Tab::MyBooks, Tab::Bookmarks].into_iter().map(|tab| html!("button", {
                .class("tab")
                .class_signal("active", dashboard.tab.signal().map(move |current| current == tab))
                .text(tab.label())
                .event(clone!(dashboard => move |_: events::Click| {
                    dashboard.tab.set_neq(tab);
                }))
            })))
        })
    }

    fn text_field(dashboard: &Rc<Self>, label: &str, get: fn(&ProfileUpdate) -> String, set: fn(&mut ProfileUpdate, String)) -> Dom {
        html!("div", {
            .class("field")
            .children(&mut [
                html!("label", {
                    .text(label)
                }),
                html!("input" => HtmlInputElement, {
                    .attr("type", "text")
                    .prop_signal("value", dashboard.update.signal_ref(get))
                    .with_node!(input => {
                        .event(clone!(dashboard => move |_: events::Input| {
                            set(&mut dashboard.update.lock_mut(), input.value());
                        }))
                    })
                }),
            ])
        })
    }

    fn render_profile(dashboard: Rc<Self>) -> Dom {
        html!("div", {
            .class("profile-form")
            .children(&mut [
                Self::text_field(&dashboard, "Full name", |u| u.full_name.clone(), |u, v| u.full_name = v),
                Self::text_field(&dashboard, "Phone number", |u| u.phone_number.clone(), |u, v| u.phone_number = v),
                html!("div", {
                    .class("field")
                    .children(&mut [
                        html!("label", {
                            .text("Gender")
                        }),
                        html!("select" => HtmlSelectElement, {
                            .children(["male", "female", "other"].into_iter().map(|gender| html!("option", {
                                .attr("value", gender)
                                .prop_signal("selected", dashboard.update.signal_ref(move |u| u.gender == gender))
                                .text(gender)
                            })))
                            .with_node!(select => {
                                .event(clone!(dashboard => move |_: events::Change| {
                                    dashboard.update.lock_mut().gender = select.value();
                                }))
                            })
                        }),
                    ])
                }),
                html!("div", {
                    .class("field")
                    .children(&mut [
                        html!("label", {
                            .text("Bio")
                        }),
                        html!("textarea" => HtmlTextAreaElement, {
                            .prop_signal("value", dashboard.update.signal_ref(|u| u.bio.clone()))
                            .with_node!(input => {
                                .event(clone!(dashboard => move |_: events::Input| {
                                    dashboard.update.lock_mut().bio = input.value();
                                }))
                            })
                        }),
                    ])
                }),
                html!("div", {
                    .class("field")
                    .children(&mut [
                        html!("label", {
                            .text("Profile picture")
                        }),
                        html!("input" => HtmlInputElement, {
                            .attr("type", "file")
                            .attr("accept", "image/*")
                            .with_node!(input => {
                                .event(clone!(dashboard => move |_: events::Change| {
                                    Self::upload_avatar(dashboard.clone(), input.clone());
                                }))
                            })
                        }),
                    ])
                }),
                html!("button", {
                    .class("primary")
                    .text("Save profile")
                    .event(clone!(dashboard => move |_: events::Click| {
                        Self::save_profile(dashboard.clone());
                    }))
                }),
            ])
        })
    }

    fn render_book_row(dashboard: &Rc<Self>, book: &Book, bookmark: bool) -> Dom {
        let card = BookCard::new(book, &dashboard.ctx.config.placeholder_cover);
        let book_id = book.id;

        html!("div", {
            .class("book-row")
            .children(&mut [
                link!(card.detail_href(), {
                    .children(&mut [
                        html!("img", {
                            .attr("src", &card.cover_url)
                            .attr("alt", &card.title)
                        })
                    ])
                }),
                link!(card.detail_href(), {
                    .class("book-title")
                    .text(&card.title)
                }),
            ])
            .apply_if(!bookmark, |dom| dom.child(link!(Route::Upload { edit: Some(book_id) }.url(), {
                .class("button")
                .text("Edit")
            })))
            .child(html!("button", {
                .class("danger")
                .text(if bookmark { "Remove" } else { "Delete" })
                .event(clone!(dashboard => move |_: events::Click| {
                    if bookmark {
                        Self::remove_bookmark(dashboard.clone(), book_id);
                    } else {
                        Self::delete_book(dashboard.clone(), book_id);
                    }
                }))
            }))
        })
    }

    fn render_empty(bookmark: bool) -> Dom {
        if bookmark {
            html!("p", {
                .class("empty")
                .text("No bookmarks yet.")
            })
        } else {
            html!("p", {
                .class("empty")
                .text("You haven't uploaded any books yet. ")
                .child(link!(Route::Upload { edit: None }.url(), {
                    .text("Upload Now")
                }))
            })
        }
    }

    fn render_books(dashboard: Rc<Self>, books: &MutableVec<Book>, bookmark: bool) -> Dom {
        html!("div", {
            .class("book-list")
            .children_signal_vec(books.signal_vec_cloned().map(clone!(dashboard => move |book| {
                Self::render_book_row(&dashboard, &book, bookmark)
            })))
            .child_signal(books.signal_vec_cloned().is_empty().map(move |is_empty| {
                is_empty.then(|| Self::render_empty(bookmark))
            }))
        })
    }

    pub fn render(dashboard: Rc<Self>) -> Dom {
        Self::fetch(dashboard.clone());

        html!("div", {
            .class("content")
            .class("dashboard")
            .children(&mut [
                Self::render_sidebar(dashboard.clone()),
                Spinner::render_signal(dashboard.is_loading.signal()),
            ])
            .child_signal(dashboard.tab.signal().map(clone!(dashboard => move |tab| Some(match tab {
                Tab::Profile => Self::render_profile(dashboard.clone()),
                Tab::MyBooks => Self::render_books(dashboard.clone(), &dashboard.my_books, false),
                Tab::Bookmarks => Self::render_books(dashboard.clone(), &dashboard.bookmarks, true),
            }))))
        })
    }
}
