use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::transport::{Body, FilePart, HttpTransport, Method, Request, Response, Transport};
use crate::{
    config::Config,
    error::{Error, Result},
    models::{
        Book, BookPage, BookPayload, BookQuery, BookmarkRequest, Category, LoginRequest,
        NewCategory, Profile, ProfileUpdate, RegisterRequest, ReportRequest, TokenResponse,
    },
    session::SessionStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Bearer,
}

/// `detail` of a non-2xx response: a message, or a list of field errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Fields(Vec<FieldError>),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
struct FieldError {
    msg: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    detail: Detail,
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detail::Message(message) => f.write_str(message),
            Detail::Fields(fields) => f.write_str(
                &fields
                    .iter()
                    .map(|field| field.msg.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Detail::Other(value) => write!(f, "{}", value),
        }
    }
}

/// `POST /files/upload` answers with a bare URL or an object holding one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum UploadResponse {
    Url(String),
    Object {
        #[serde(alias = "file_url")]
        url: String,
    },
}

impl UploadResponse {
    fn into_url(self) -> String {
        match self {
            UploadResponse::Url(url) => url,
            UploadResponse::Object { url } => url,
        }
    }
}

pub(crate) fn http_error(response: &Response) -> Error {
    let detail = serde_json::from_slice::<ErrorBody>(&response.body)
        .map(|body| body.detail.to_string())
        .ok()
        .or_else(|| response.reason.clone())
        .unwrap_or_else(|| format!("status {}", response.status));

    Error::Http {
        status: response.status,
        detail,
    }
}

fn decode<R: DeserializeOwned>(response: &Response) -> Result<R> {
    if response.status == 204 || response.body.is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&response.body)?)
}

fn to_json<B: Serialize>(body: &B) -> Result<Body> {
    Ok(Body::Json(serde_json::to_value(body)?))
}

/// Client for the LibreShelf REST API.
///
/// Bearer calls read the token from the injected session on every request,
/// so a login or logout is visible immediately.
pub struct ApiClient<T = HttpTransport> {
    transport: T,
    session: SessionStore,
}

impl ApiClient<HttpTransport> {
    pub fn from_config(config: &Config, session: SessionStore) -> Self {
        Self::new(HttpTransport::new(config.api_base_url.clone()), session)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, session: SessionStore) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    async fn send(&self, mut request: Request, access: Access) -> Result<Response> {
        if access == Access::Bearer {
            match self.session.token() {
                Some(token) => request.bearer = Some(token),
                None => {
                    error!("authorization required for {}", request.path);
                    return Err(Error::Auth);
                }
            }
        }

        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let err = http_error(&response);
            error!("api error on {} {}: {}", method.as_str(), path, err);
            return Err(err);
        }

        Ok(response)
    }

    async fn call<R: DeserializeOwned>(&self, request: Request, access: Access) -> Result<R> {
        let response = self.send(request, access).await?;
        decode(&response)
    }

    async fn execute(&self, request: Request, access: Access) -> Result<()> {
        self.send(request, access).await.map(|_| ())
    }

    fn request(method: Method, path: impl Into<String>) -> Request {
        Request::new(method, path)
    }

    fn request_with<B: Serialize>(method: Method, path: impl Into<String>, body: &B) -> Result<Request> {
        let mut request = Request::new(method, path);
        request.body = to_json(body)?;
        Ok(request)
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<TokenResponse> {
        let body = LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        };
        self.call(Self::request_with(Method::Post, "/auth/login", &body)?, Access::Public)
            .await
    }

    /// Returns the raw body, callers decide what counts as a created account.
    pub async fn register(&self, body: &RegisterRequest) -> Result<serde_json::Value> {
        self.call(Self::request_with(Method::Post, "/auth/register", body)?, Access::Public)
            .await
    }

    pub async fn me(&self) -> Result<Profile> {
        self.call(Self::request(Method::Get, "/users/me"), Access::Bearer)
            .await
    }

    pub async fn update_user(&self, user_id: i64, update: &ProfileUpdate) -> Result<()> {
        let path = format!("/users/{}/", user_id);
        self.execute(Self::request_with(Method::Patch, path, update)?, Access::Bearer)
            .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.call(Self::request(Method::Get, "/categories/"), Access::Public)
            .await
    }

    pub async fn create_category(&self, category: &NewCategory) -> Result<Category> {
        self.call(Self::request_with(Method::Post, "/categories", category)?, Access::Bearer)
            .await
    }

    pub async fn delete_category(&self, category_id: i64) -> Result<()> {
        let path = format!("/categories/{}", category_id);
        self.execute(Self::request(Method::Delete, path), Access::Bearer)
            .await
    }

    pub async fn books(&self, query: &BookQuery) -> Result<BookPage> {
        let mut request = Self::request(Method::Get, "/books/");
        request.query = query.to_pairs();
        self.call(request, Access::Public).await
    }

    pub async fn book(&self, book_id: i64) -> Result<Book> {
        let path = format!("/books/{}", book_id);
        self.call(Self::request(Method::Get, path), Access::Public)
            .await
    }

    pub async fn create_book(&self, payload: &BookPayload) -> Result<()> {
        self.execute(Self::request_with(Method::Post, "/books/", payload)?, Access::Bearer)
            .await
    }

    pub async fn update_book(&self, book_id: i64, payload: &BookPayload) -> Result<()> {
        let path = format!("/books/{}", book_id);
        self.execute(Self::request_with(Method::Patch, path, payload)?, Access::Bearer)
            .await
    }

    pub async fn delete_book(&self, book_id: i64) -> Result<()> {
        let path = format!("/books/{}", book_id);
        self.execute(Self::request(Method::Delete, path), Access::Bearer)
            .await
    }

    pub async fn bookmarks(&self) -> Result<Vec<Book>> {
        let books: Option<Vec<Book>> = self
            .call(Self::request(Method::Get, "/books/bookmark/me/"), Access::Bearer)
            .await?;
        Ok(books.unwrap_or_default())
    }

    pub async fn add_bookmark(&self, book_id: i64) -> Result<()> {
        let body = BookmarkRequest { book_id };
        self.execute(Self::request_with(Method::Post, "/books/bookmark/", &body)?, Access::Bearer)
            .await
    }

    pub async fn remove_bookmark(&self, book_id: i64) -> Result<()> {
        let path = format!("/books/bookmark/{}/", book_id);
        self.execute(Self::request(Method::Delete, path), Access::Bearer)
            .await
    }

    pub async fn report(&self, book_id: i64, reason: &str) -> Result<()> {
        let body = ReportRequest {
            book_id,
            reason: reason.to_string(),
        };
        self.execute(Self::request_with(Method::Post, "/books/report/", &body)?, Access::Bearer)
            .await
    }

    /// Uploads one file and returns the URL the server stored it under.
    pub async fn upload_file(&self, file: FilePart) -> Result<String> {
        let mut request = Self::request(Method::Post, "/files/upload");
        request.body = Body::File(file);
        let response: UploadResponse = self.call(request, Access::Bearer).await?;
        Ok(response.into_url())
    }
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::testing::{FakeTransport, client_with};

    #[tokio::test]
    async fn test_bearer_call_without_token_never_reaches_transport() {
        let transport = Rc::new(FakeTransport::new());
        let client = client_with(transport.clone(), None);

        let result = client.me().await;

        assert_eq!(result, Err(Error::Auth));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_bearer_header_attached_and_public_calls_anonymous() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Get, "/categories/", 200, json!([]));
        transport.respond(Method::Delete, "/books/9", 204, json!(null));
        let client = client_with(transport.clone(), Some("tok"));

        client.categories().await.unwrap();
        client.delete_book(9).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].bearer, None);
        assert_eq!(requests[1].bearer.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_error_detail_surfaced() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(
            Method::Post,
            "/books/",
            403,
            json!({"detail": "Not enough permissions"}),
        );
        transport.respond(
            Method::Post,
            "/auth/register",
            422,
            json!({"detail": [{"msg": "field required"}, {"msg": "invalid email"}]}),
        );
        let client = client_with(transport.clone(), Some("tok"));

        let payload = BookPayload {
            title: "t".to_string(),
            description: "d".to_string(),
            category_ids: vec![1],
            thumbnail: "a".to_string(),
            file_url: "b".to_string(),
            metadata: "{}".to_string(),
        };
        assert_eq!(
            client.create_book(&payload).await,
            Err(Error::Http {
                status: 403,
                detail: "Not enough permissions".to_string()
            })
        );

        let form = crate::models::RegisterForm::default();
        let request = RegisterRequest::from_form(&form, chrono::Utc::now());
        assert_eq!(
            client.register(&request).await,
            Err(Error::Http {
                status: 422,
                detail: "field required, invalid email".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_error_without_body_uses_reason() {
        let transport = Rc::new(FakeTransport::new());
        let client = client_with(transport, None);

        let err = client.book(1).await.unwrap_err();

        assert_eq!(
            err,
            Error::Http {
                status: 404,
                detail: "Not Found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let transport = Rc::new(FakeTransport::new());
        transport.fail(Method::Get, "/books/", Error::Network("connection refused".to_string()));
        let client = client_with(transport, None);

        let err = client.books(&BookQuery::new(1, 12)).await.unwrap_err();

        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_upload_response_shapes() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(
            Method::Post,
            "/files/upload",
            200,
            json!({"file_url": "https://cdn.example.com/a.pdf"}),
        );
        transport.respond(Method::Post, "/files/upload", 200, json!("https://cdn.example.com/b.png"));
        let client = client_with(transport.clone(), Some("tok"));

        let first = client
            .upload_file(FilePart::new("a.pdf", vec![1, 2, 3]))
            .await
            .unwrap();
        let second = client
            .upload_file(FilePart::new("b.png", vec![4]))
            .await
            .unwrap();

        assert_eq!(first, "https://cdn.example.com/a.pdf");
        assert_eq!(second, "https://cdn.example.com/b.png");
        assert!(matches!(transport.requests()[0].body, Body::File(_)));
    }

    #[tokio::test]
    async fn test_book_list_shape_mismatch_is_decode_error() {
        let transport = Rc::new(FakeTransport::new());
        transport.respond(Method::Get, "/books/", 200, json!([{"id": 1}]));
        let client = client_with(transport, None);

        let err = client.books(&BookQuery::new(1, 12)).await.unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }
}
