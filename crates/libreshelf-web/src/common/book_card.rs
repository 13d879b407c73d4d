use dominator::{Dom, html, link};
use libreshelf_lib::view::BookCard;

pub fn render(card: &BookCard) -> Dom {
    let target = if card.file_url.is_some() {
        "_blank"
    } else {
        "_self"
    };

    html!("div", {
        .class("book-card")
        .children(&mut [
            link!(card.detail_href(), {
                .class("book-cover")
                .children(&mut [
                    html!("img", {
                        .attr("src", &card.cover_url)
                        .attr("alt", &card.title)
                        .attr("loading", "lazy")
                    })
                ])
            }),
            html!("div", {
                .class("book-info")
                .children(&mut [
                    link!(card.detail_href(), {
                        .class("book-title")
                        .text(&card.title)
                    }),
                    html!("p", {
                        .class("book-author")
                        .text(&card.author)
                    }),
                    html!("p", {
                        .class("book-description")
                        .text(&card.description)
                    }),
                    html!("a", {
                        .class("book-download")
                        .attr("href", card.download_href())
                        .attr("target", target)
                        .attr("title", "Download PDF")
                        .text("Download")
                    }),
                ])
            })
        ])
    })
}
