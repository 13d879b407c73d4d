use dominator::{Dom, html};
use futures_signals::signal::Signal;

pub struct Spinner;

impl Spinner {
    pub fn render() -> Dom {
        html!("div", {
            .class("spinner")
            .children(&mut [
                html!("div", {
                    .class("loader")
                })
            ])
        })
    }

    pub fn render_signal<S>(active: S) -> Dom
    where
        S: Signal<Item = bool> + 'static,
    {
        html!("div", {
            .class("spinner")
            .visible_signal(active)
            .children(&mut [
                html!("div", {
                    .class("loader")
                })
            ])
        })
    }
}
