//! Display projections of books with the fallbacks shown when the server
//! leaves a field out.

use crate::models::Book;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const NO_DESCRIPTION: &str = "No description.";
pub const NO_DETAIL_DESCRIPTION: &str = "No description available for this title.";
pub const FALLBACK_CATEGORY: &str = "General";
pub const UNAVAILABLE: &str = "Unavailable";

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCard {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_url: String,
    pub file_url: Option<String>,
}

impl BookCard {
    pub fn new(book: &Book, placeholder_cover: &str) -> Self {
        Self {
            id: book.id,
            title: present(&book.title).unwrap_or(UNTITLED).to_string(),
            author: present(&book.author).unwrap_or(UNKNOWN_AUTHOR).to_string(),
            description: present(&book.description)
                .unwrap_or(NO_DESCRIPTION)
                .to_string(),
            cover_url: present(&book.thumbnail)
                .unwrap_or(placeholder_cover)
                .to_string(),
            file_url: present(&book.file_url).map(str::to_string),
        }
    }

    pub fn detail_href(&self) -> String {
        format!("/detail?id={}", self.id)
    }

    /// `#` when the book has no document.
    pub fn download_href(&self) -> &str {
        self.file_url.as_deref().unwrap_or("#")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetail {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_url: String,
    pub categories: Vec<String>,
    pub file_url: Option<String>,
}

impl BookDetail {
    pub fn new(book: &Book, placeholder_cover: &str) -> Self {
        let mut categories: Vec<String> = book
            .categories
            .iter()
            .map(|category| category.name().trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        if categories.is_empty() {
            categories.push(FALLBACK_CATEGORY.to_string());
        }

        Self {
            id: book.id,
            title: present(&book.title).unwrap_or(UNTITLED).to_string(),
            author: present(&book.author).unwrap_or(UNKNOWN_AUTHOR).to_string(),
            description: present(&book.description)
                .unwrap_or(NO_DETAIL_DESCRIPTION)
                .to_string(),
            cover_url: present(&book.thumbnail)
                .unwrap_or(placeholder_cover)
                .to_string(),
            categories,
            file_url: present(&book.file_url).map(str::to_string),
        }
    }

    pub fn is_downloadable(&self) -> bool {
        self.file_url.is_some()
    }

    /// Only PDF documents get the inline viewer.
    pub fn is_pdf(&self) -> bool {
        self.file_url.as_deref().is_some_and(is_pdf_url)
    }
}

pub fn is_pdf_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.to_ascii_lowercase().ends_with(".pdf")
}

/// Books whose `author_id` matches the signed-in user.
pub fn owned_by(books: Vec<Book>, user_id: i64) -> Vec<Book> {
    books
        .into_iter()
        .filter(|book| book.author_id == Some(user_id))
        .collect()
}

/// Result count label for the catalog, preferring the server total.
pub fn result_count(total: Option<i64>, loaded: usize) -> String {
    let count = total.unwrap_or(loaded as i64);
    match count {
        1 => "1 book".to_string(),
        n => format!("{} books", n),
    }
}
