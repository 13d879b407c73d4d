use std::rc::Rc;

use dominator::{Dom, clone, events, html, link, routing};
use futures_signals::signal::SignalExt;
use libreshelf_lib::{
    auth::AuthState,
    models::{DEFAULT_AVATAR, Role},
    theme::ThemePreference,
};

use crate::{
    Context,
    common::Route,
    utils::{self, BrowserStorage},
};

pub struct Navbar;

impl Navbar {
    fn toggle_theme() {
        let theme = ThemePreference::new(&BrowserStorage).toggle(utils::is_dark());
        info!("theme set to {}", theme.as_str());
        utils::apply_theme();
    }

    fn reset_theme() {
        ThemePreference::new(&BrowserStorage).reset();
        utils::apply_theme();
    }

    fn render_account(ctx: &Rc<Context>, role: Role) -> Dom {
        let name = ctx.session.display_name().unwrap_or_default();
        let avatar = ctx
            .session
            .avatar_url()
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string());

        html!("div", {
            .class("navbar-account")
            .children(&mut [
                html!("img", {
                    .class("avatar")
                    .attr("src", &avatar)
                    .attr("alt", &name)
                }),
                html!("span", {
                    .text(&name)
                }),
                link!(Route::Dashboard.url(), {
                    .text("Dashboard")
                }),
            ])
            .apply_if(role.can_upload(), |dom| dom.child(link!(Route::Upload { edit: None }.url(), {
                .text("Upload Book")
            })))
            .apply_if(role.is_admin(), |dom| dom.child(link!(Route::Admin.url(), {
                .class("admin-link")
                .text("Admin Panel")
            })))
            .child(html!("button", {
                .class("logout")
                .text("Logout")
                .event(clone!(ctx => move |_: events::Click| {
                    if utils::confirm("Log out of LibreShelf?") {
                        ctx.auth.logout();
                        routing::go_to_url(&Route::Home.url());
                    }
                }))
            }))
        })
    }

    pub fn render(ctx: Rc<Context>) -> Dom {
        html!("nav", {
            .class("navbar")
            .children(&mut [
                link!(Route::Home.url(), {
                    .class("brand")
                    .text("LibreShelf")
                }),
                html!("div", {
                    .class("navbar-links")
                    .children(&mut [
                        link!(Route::Home.url(), { .text("Home") }),
                        link!(Route::Catalog { search: None, category: None }.url(), { .text("Categories") }),
                    ])
                }),
                html!("button", {
                    .class("theme-toggle")
                    .attr("title", "Toggle theme")
                    .text("Theme")
                    .event(|_: events::Click| Self::toggle_theme())
                    .event(|_: events::DoubleClick| Self::reset_theme())
                }),
            ])
            .child_signal(ctx.auth.state_signal().map(clone!(ctx => move |state| {
                match state {
                    AuthState::Authenticated(role) => Some(Self::render_account(&ctx, role)),
                    AuthState::Authenticating => None,
                    AuthState::Anonymous => Some(html!("div", {
                        .class("navbar-account")
                        .children(&mut [
                            link!(Route::SignIn.url(), {
                                .class("button")
                                .text("Sign In")
                            }),
                            link!(Route::SignUp.url(), {
                                .text("Sign Up")
                            }),
                        ])
                    })),
                }
            })))
        })
    }
}
