use std::rc::Rc;

use dominator::{Dom, clone, html, routing};
use futures_signals::signal::SignalExt;
use libreshelf_lib::session::Gate;

use crate::{
    Context,
    common::{Navbar, Route, footer, snackbar},
    pages::{Admin, Catalog, Dashboard, Detail, Home, SignIn, SignUp, Upload},
    utils::{self, AsyncLoader},
};

pub struct App {
    ctx: Rc<Context>,
    loader: AsyncLoader,
}

impl App {
    pub fn new(ctx: Rc<Context>) -> Rc<Self> {
        Rc::new(App {
            ctx,
            loader: AsyncLoader::new(),
        })
    }

    fn check_auth(app: Rc<Self>) {
        if !app.ctx.session.is_authenticated() {
            return;
        }

        app.loader.load(clone!(app => async move {
            if !app.ctx.auth.check_auth_on_load().await {
                snackbar::show("Your session has expired. Please sign in again.".to_string());
            }
        }));
    }

    /// Sends the visitor elsewhere when the stored role does not allow the page.
    fn guard(&self, gate: Gate, fallback: Route) -> bool {
        if self.ctx.session.allows(gate) {
            true
        } else {
            info!("{:?} denied, redirecting to {}", gate, fallback.url());
            routing::go_to_url(&fallback.url());
            false
        }
    }

    fn render_route(app: &Rc<Self>, route: Route) -> Option<Dom> {
        let ctx = app.ctx.clone();
        match route {
            Route::Home => Some(Home::render(Home::new(ctx))),
            Route::Catalog { search, category } => {
                Some(Catalog::render(Catalog::new(ctx, search, category)))
            }
            Route::Detail(Some(id)) => Some(Detail::render(Detail::new(ctx, id))),
            Route::Detail(None) => {
                utils::alert("No book specified!");
                routing::go_to_url(&Route::Home.url());
                None
            }
            Route::Upload { edit } => app
                .guard(Gate::Upload, Route::SignIn)
                .then(|| Upload::render(Upload::new(ctx, edit))),
            Route::Admin => app
                .guard(Gate::Admin, Route::Home)
                .then(|| Admin::render(Admin::new(ctx))),
            Route::Dashboard => app
                .guard(Gate::Dashboard, Route::SignIn)
                .then(|| Dashboard::render(Dashboard::new(ctx))),
            Route::SignIn => Some(SignIn::render(SignIn::new(ctx))),
            Route::SignUp => Some(SignUp::render(SignUp::new(ctx))),
            Route::NotFound => Some(html!("div", {
                .class("content")
                .text("Page not found")
            })),
        }
    }

    pub fn render(app: Rc<Self>) -> Dom {
        Self::check_auth(app.clone());

        html!("div", {
            .class("app")
            .children(&mut [
                Navbar::render(app.ctx.clone()),
            ])
            .child_signal(Route::signal().map(clone!(app => move |route| {
                Self::render_route(&app, route)
            })))
            .children(&mut [
                footer::render(),
                snackbar::render(),
            ])
        })
    }
}
