use std::rc::Rc;

use dominator::{Dom, clone, events, html, svg};
use futures_signals::signal::{Mutable, SignalExt};
use libreshelf_lib::Error;

thread_local! {
    static SNACKBAR: Rc<Snackbar> = Snackbar::new();
}

pub fn show(message: String) {
    SNACKBAR.with(|s| s.show(message));
}

/// Logs the failure and shows the text meant for the user.
pub fn show_error(context: &str, err: &Error) {
    error!("{}: {}", context, err);
    show(err.user_message());
}

pub fn render() -> Dom {
    SNACKBAR.with(|s| Snackbar::render(s.clone()))
}

pub struct Snackbar {
    message: Mutable<Option<String>>,
}

impl Snackbar {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            message: Mutable::new(None),
        })
    }

    pub fn show(&self, message: String) {
        self.message.set(Some(message));
    }

    pub fn render(snackbar: Rc<Self>) -> Dom {
        html!("div", {
            .class("snackbar")
            .visible_signal(snackbar.message.signal_ref(|message| message.is_some()))
            .children(&mut [
                html!("div", {
                    .child_signal(snackbar.message.signal_cloned().map(|message| message.map(|msg| html!("span", {
                        .text(&msg)
                    }))))
                    .children(&mut [
                        html!("button", {
                            .attr("aria-label", "Dismiss")
                            .event(clone!(snackbar => move |_: events::Click| snackbar.message.set(None)))
                            .children(&mut [
                                svg!("svg", {
                                    .attr("xmlns", "http://www.w3.org/2000/svg")
                                    .attr("viewBox", "0 0 24 24")
                                    .attr("stroke", "currentColor")
                                    .attr("fill", "none")
                                    .class("icon")
                                    .children(&mut [
                                        svg!("path", {
                                            .attr("stroke-linecap", "round")
                                            .attr("stroke-linejoin", "round")
                                            .attr("stroke-width", "2")
                                            .attr("d", "M6 18L18 6M6 6l12 12")
                                        }),
                                    ])
                                })
                            ])
                        })
                    ])
                })
            ])
        })
    }
}
