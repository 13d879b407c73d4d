use serde::{Deserialize, Serialize};

use super::null_as_default;

/// A read-only projection of a book as the server returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Book {
    pub id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub author_id: Option<i64>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<CategoryRef>,
}

/// Categories attached to a book come either as objects or as bare names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Entry {
        #[serde(default)]
        id: Option<i64>,
        name: String,
    },
    Name(String),
}

impl CategoryRef {
    pub fn id(&self) -> Option<i64> {
        match self {
            CategoryRef::Entry { id, .. } => *id,
            CategoryRef::Name(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CategoryRef::Entry { name, .. } => name,
            CategoryRef::Name(name) => name,
        }
    }
}

/// Expected shape of `GET /books/`: `{"books": [...], "total": n}`.
///
/// `data` is accepted as an alias of `books`. Any other shape is a decode
/// error instead of an empty page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookPage {
    #[serde(alias = "data")]
    pub books: Vec<Book>,
    #[serde(default)]
    pub total: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub category_id: Option<i64>,
}

impl BookQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
            category_id: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category(mut self, category_id: Option<i64>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Empty search and missing category are left out, the server rejects
    /// `category_id=`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(("category_id".to_string(), category_id.to_string()));
        }
        pairs
    }
}

/// Body of `POST /books/` and `PATCH /books/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookPayload {
    pub title: String,
    pub description: String,
    pub category_ids: Vec<i64>,
    pub thumbnail: String,
    pub file_url: String,
    pub metadata: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkRequest {
    pub book_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub book_id: i64,
    pub reason: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_book_page_accepts_data_alias() {
        let page: BookPage =
            serde_json::from_str(r#"{"data": [{"id": 1, "title": "Dune"}], "total": 40}"#).unwrap();
        assert_eq!(page.books.len(), 1);
        assert_eq!(page.total, Some(40));
    }

    #[test]
    fn test_book_page_rejects_unknown_shape() {
        let page = serde_json::from_str::<BookPage>(r#"{"items": []}"#);
        assert!(page.is_err());
    }

    #[test]
    fn test_book_categories_mixed_forms() {
        let book: Book = serde_json::from_str(
            r#"{"id": 3, "categories": [{"id": 2, "name": "Physics"}, "Math"], "thumbnail": null}"#,
        )
        .unwrap();
        let names: Vec<&str> = book.categories.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Physics", "Math"]);
        assert_eq!(book.categories[0].id(), Some(2));
        assert_eq!(book.thumbnail, None);
    }

    #[test]
    fn test_null_categories() {
        let book: Book = serde_json::from_str(r#"{"id": 3, "categories": null}"#).unwrap();
        assert!(book.categories.is_empty());
    }

    #[test]
    fn test_query_pairs_skip_empty_filters() {
        let query = BookQuery::new(2, 12).with_search("");
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "12".to_string())
            ]
        );

        let query = BookQuery::new(1, 12)
            .with_search("rust")
            .with_category(Some(4));
        let pairs = query.to_pairs();
        assert!(pairs.contains(&("search".to_string(), "rust".to_string())));
        assert!(pairs.contains(&("category_id".to_string(), "4".to_string())));
    }
}
