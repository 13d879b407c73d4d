use dominator::{Dom, html, link};

use crate::common::Route;

pub fn render() -> Dom {
    html!("footer", {
        .class("footer")
        .children(&mut [
            html!("div", {
                .class("footer-links")
                .children(&mut [
                    link!(Route::Home.url(), { .text("Home") }),
                    link!(Route::Catalog { search: None, category: None }.url(), { .text("Categories") }),
                    link!(Route::Upload { edit: None }.url(), { .text("Upload") }),
                ])
            }),
            html!("p", {
                .class("copyright")
                .text("LibreShelf. Free books for every learner.")
            }),
        ])
    })
}
