use std::rc::Rc;

use dominator::{Dom, clone, events, html, link, routing, with_node};
use futures_signals::signal::{Mutable, SignalExt};
use libreshelf_lib::{Error, models::RegisterForm};
use web_sys::HtmlInputElement;

use crate::{
    Context,
    common::Route,
    utils::{self, AsyncLoader},
};

pub struct SignUp {
    ctx: Rc<Context>,
    form: Mutable<RegisterForm>,
    is_submitting: Mutable<bool>,
    loader: AsyncLoader,
}

impl SignUp {
    pub fn new(ctx: Rc<Context>) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            form: Mutable::new(RegisterForm::default()),
            is_submitting: Mutable::new(false),
            loader: AsyncLoader::new(),
        })
    }

    fn register(signup: Rc<Self>) {
        let form = signup.form.get_cloned();
        if let Err(Error::Validation(message)) = form.validate() {
            utils::alert(&message);
            return;
        }

        signup.is_submitting.set(true);
        signup.loader.load(clone!(signup => async move {
            match signup.ctx.auth.register(&form).await {
                Ok(()) => {
                    utils::alert("Account created successfully! Please Login.");
                    routing::go_to_url(&Route::SignIn.url());
                }
                Err(Error::Http { detail, .. }) => {
                    utils::alert(&format!("Registration Failed: {}", detail));
                }
                Err(Error::Network(e)) => {
                    error!("register failed: {}", e);
                    utils::alert("Network error.");
                }
                Err(e) => utils::alert(&e.user_message()),
            }
            signup.is_submitting.set(false);
        }));
    }

    fn field(signup: &Rc<Self>, kind: &str, placeholder: &str, set: fn(&mut RegisterForm, String)) -> Dom {
        html!("input" => HtmlInputElement, {
            .attr("type", kind)
            .attr("placeholder", placeholder)
            .with_node!(input => {
                .event(clone!(signup => move |_: events::Input| {
                    set(&mut signup.form.lock_mut(), input.value());
                }))
            })
        })
    }

    pub fn render(signup: Rc<Self>) -> Dom {
        html!("div", {
            .class("content")
            .class("auth-form")
            .children(&mut [
                html!("h1", {
                    .text("Create an account")
                }),
                Self::field(&signup, "text", "Username", |f, v| f.username = v),
                Self::field(&signup, "text", "Full name", |f, v| f.full_name = v),
                Self::field(&signup, "email", "Email", |f, v| f.email = v),
                Self::field(&signup, "password", "Password", |f, v| f.password = v),
                Self::field(&signup, "password", "Confirm password", |f, v| f.confirm_password = v),
                html!("button", {
                    .class("primary")
                    .prop_signal("disabled", signup.is_submitting.signal())
                    .text_signal(signup.is_submitting.signal().map(|submitting| {
                        if submitting { "Creating Account..." } else { "Sign Up" }
                    }))
                    .event(clone!(signup => move |_: events::Click| {
                        Self::register(signup.clone());
                    }))
                }),
                html!("p", {
                    .text("Already have an account? ")
                    .child(link!(Route::SignIn.url(), {
                        .text("Sign in")
                    }))
                }),
            ])
        })
    }
}
