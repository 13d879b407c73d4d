use std::rc::Rc;

use dominator::{Dom, EventOptions, clone, events, html, link, routing, with_node};
use futures_signals::signal::{Mutable, SignalExt};
use web_sys::HtmlInputElement;

use crate::{
    Context,
    common::Route,
    utils::{self, AsyncLoader},
};

pub struct SignIn {
    ctx: Rc<Context>,
    identifier: Mutable<String>,
    password: Mutable<String>,
    error: Mutable<Option<String>>,
    is_submitting: Mutable<bool>,
    loader: AsyncLoader,
}

impl SignIn {
    pub fn new(ctx: Rc<Context>) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            identifier: Mutable::new("".to_string()),
            password: Mutable::new("".to_string()),
            error: Mutable::new(None),
            is_submitting: Mutable::new(false),
            loader: AsyncLoader::new(),
        })
    }

    pub fn login(signin: Rc<Self>) {
        let identifier = signin.identifier.get_cloned();
        let password = signin.password.get_cloned();
        signin.error.set(None);
        signin.is_submitting.set(true);

        signin.loader.load(clone!(signin => async move {
            match signin.ctx.auth.login(&identifier, &password).await {
                Ok(_) => {
                    utils::alert("Welcome back!");
                    routing::go_to_url(&Route::Home.url());
                }
                Err(e) => {
                    error!("login failed: {}", e);
                    signin.error.set(Some(e.user_message()));
                }
            }
            signin.is_submitting.set(false);
        }));
    }

    fn input(signin: &Rc<Self>, kind: &str, placeholder: &str, value: &Mutable<String>) -> Dom {
        html!("input" => HtmlInputElement, {
            .attr("type", kind)
            .attr("placeholder", placeholder)
            .prop_signal("value", value.signal_cloned())
            .with_node!(input => {
                .event(clone!(value => move |_: events::Input| {
                    value.set(input.value());
                }))
                .event_with_options(&EventOptions::preventable(), clone!(signin => move |e: events::KeyDown| {
                    if e.key() == "Enter" {
                        e.prevent_default();
                        Self::login(signin.clone());
                    }
                }))
            })
        })
    }

    pub fn render(signin: Rc<Self>) -> Dom {
        html!("div", {
            .class("content")
            .class("auth-form")
            .children(&mut [
                html!("h1", {
                    .text("Sign In")
                }),
                Self::input(&signin, "text", "Email or username", &signin.identifier),
                Self::input(&signin, "password", "Password", &signin.password),
            ])
            .child_signal(signin.error.signal_cloned().map(|error| error.map(|message| html!("p", {
                .class("error")
                .text(&message)
            }))))
            .children(&mut [
                html!("button", {
                    .class("primary")
                    .prop_signal("disabled", signin.is_submitting.signal())
                    .text_signal(signin.is_submitting.signal().map(|submitting| {
                        if submitting { "Signing in..." } else { "Sign In" }
                    }))
                    .event(clone!(signin => move |_: events::Click| {
                        Self::login(signin.clone());
                    }))
                }),
                html!("p", {
                    .text("No account yet? ")
                    .child(link!(Route::SignUp.url(), {
                        .text("Sign up")
                    }))
                }),
            ])
        })
    }
}
