use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use async_trait::async_trait;

use crate::{
    api::{ApiClient, Method, Request, Response, Transport},
    error::Error,
    session::SessionStore,
    storage::MemoryStore,
};

type Reply = Result<Response, Error>;

/// Scripted transport. Replies registered for a route are consumed in
/// order, the last one repeats. Unknown routes answer 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: RefCell<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: RefCell<Vec<Request>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .borrow_mut()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        let body = if body.is_null() {
            vec![]
        } else {
            serde_json::to_vec(&body).unwrap()
        };
        self.push(
            method,
            path,
            Ok(Response {
                status,
                reason: None,
                body,
            }),
        );
    }

    pub fn fail(&self, method: Method, path: &str, error: Error) {
        self.push(method, path, Err(error));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Request> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn send(&self, request: Request) -> Result<Response, Error> {
        let key = (request.method, request.path.clone());
        self.requests.borrow_mut().push(request);

        let mut routes = self.routes.borrow_mut();
        match routes.get_mut(&key) {
            Some(replies) if replies.len() > 1 => replies.pop_front().unwrap(),
            Some(replies) if !replies.is_empty() => replies[0].clone(),
            _ => Ok(Response {
                status: 404,
                reason: Some("Not Found".to_string()),
                body: vec![],
            }),
        }
    }
}

pub fn client_with(
    transport: Rc<FakeTransport>,
    token: Option<&str>,
) -> ApiClient<Rc<FakeTransport>> {
    let session = SessionStore::new(Rc::new(MemoryStore::new()));
    if let Some(token) = token {
        session.create(token);
    }
    ApiClient::new(transport, session)
}
