//! In-process fake of the user directory REST API.
//!
//! The fake keeps users in memory, records every request line, and can be
//! told to fail the next request with a given status and message.

#![allow(dead_code, reason = "each test binary uses a subset of the fake")]

use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Deserialize)]
struct Body {
    name: String,
    email: String,
    address: String,
}

#[derive(Debug, Clone)]
struct StoredUser {
    id: String,
    body: Body,
}

impl StoredUser {
    fn to_json(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.body.name,
            "email": self.body.email,
            "address": self.body.address,
            "__v": 0,
        })
    }
}

#[derive(Debug, Default)]
struct FakeState {
    users: Vec<StoredUser>,
    next_id: u64,
    requests: Vec<String>,
    fail_next: Option<(u16, Option<String>)>,
    creates_without_record: bool,
}

/// Shared handle onto the fake's state.
#[derive(Debug, Clone, Default)]
pub struct FakeApi(Arc<Mutex<FakeState>>);

impl FakeApi {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.0.lock().expect("fake api state")
    }

    /// Store a user and return its id.
    pub fn seed(&self, name: &str, email: &str, address: &str) -> String {
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("u{}", state.next_id);
        state.users.push(StoredUser {
            id: id.clone(),
            body: Body {
                name: name.to_owned(),
                email: email.to_owned(),
                address: address.to_owned(),
            },
        });
        id
    }

    /// Answer the next request with `status` and an optional message body.
    pub fn fail_next(&self, status: u16, message: Option<&str>) {
        self.lock().fail_next = Some((status, message.map(str::to_owned)));
    }

    /// Answer later creates with a message-only `201 Created` body.
    pub fn acknowledge_creates_without_record(&self) {
        self.lock().creates_without_record = true;
    }

    /// Request lines received so far, such as `DELETE /api/delete/user/u1`.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// Names of the stored users in order.
    pub fn names(&self) -> Vec<String> {
        self.lock()
            .users
            .iter()
            .map(|user| user.body.name.clone())
            .collect()
    }

    fn begin(&self, request: &HttpRequest) -> Option<HttpResponse> {
        let mut state = self.lock();
        state
            .requests
            .push(format!("{} {}", request.method(), request.path()));
        let (status, message) = state.fail_next.take()?;
        let status = actix_web::http::StatusCode::from_u16(status).expect("valid status");
        let mut response = HttpResponse::build(status);
        Some(match message {
            Some(message) => response.json(json!({ "message": message })),
            None => response.finish(),
        })
    }
}

async fn list(api: web::Data<FakeApi>, request: HttpRequest) -> HttpResponse {
    if let Some(response) = api.begin(&request) {
        return response;
    }
    let users: Vec<Value> = api.lock().users.iter().map(StoredUser::to_json).collect();
    HttpResponse::Ok().json(users)
}

async fn get(api: web::Data<FakeApi>, request: HttpRequest, id: web::Path<String>) -> HttpResponse {
    if let Some(response) = api.begin(&request) {
        return response;
    }
    let state = api.lock();
    match state.users.iter().find(|user| user.id == *id) {
        Some(user) => HttpResponse::Ok().json(user.to_json()),
        None => HttpResponse::NotFound().json(json!({ "message": "User not found." })),
    }
}

async fn create(
    api: web::Data<FakeApi>,
    request: HttpRequest,
    body: web::Json<Body>,
) -> HttpResponse {
    if let Some(response) = api.begin(&request) {
        return response;
    }
    let mut state = api.lock();
    if state.users.iter().any(|user| user.body.email == body.email) {
        return HttpResponse::BadRequest().json(json!({ "message": "User already exists." }));
    }
    state.next_id += 1;
    let user = StoredUser {
        id: format!("u{}", state.next_id),
        body: body.into_inner(),
    };
    let payload = if state.creates_without_record {
        json!({ "message": "User created successfully." })
    } else {
        json!({ "message": "User created successfully.", "user": user.to_json() })
    };
    state.users.push(user);
    HttpResponse::Created().json(payload)
}

async fn update(
    api: web::Data<FakeApi>,
    request: HttpRequest,
    id: web::Path<String>,
    body: web::Json<Body>,
) -> HttpResponse {
    if let Some(response) = api.begin(&request) {
        return response;
    }
    let mut state = api.lock();
    match state.users.iter_mut().find(|user| user.id == *id) {
        Some(user) => {
            user.body = body.into_inner();
            HttpResponse::Ok().json(json!({ "message": "User updated successfully." }))
        }
        None => HttpResponse::NotFound().json(json!({ "message": "User not found." })),
    }
}

async fn delete(
    api: web::Data<FakeApi>,
    request: HttpRequest,
    id: web::Path<String>,
) -> HttpResponse {
    if let Some(response) = api.begin(&request) {
        return response;
    }
    let mut state = api.lock();
    let before = state.users.len();
    state.users.retain(|user| user.id != *id);
    if state.users.len() == before {
        return HttpResponse::NotFound().json(json!({ "message": "User not found." }));
    }
    HttpResponse::Ok().json(json!({ "message": "User deleted successfully." }))
}

/// Running fake server.
pub struct FakeServer {
    /// State shared with the handlers.
    pub api: FakeApi,
    /// Base URL including the `/api` prefix.
    pub base_url: url::Url,
    handle: ServerHandle,
}

impl FakeServer {
    /// Bind to an ephemeral port and serve until [`Self::stop`].
    pub fn start() -> Self {
        let api = FakeApi::default();
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let data = web::Data::new(api.clone());
        let server = HttpServer::new(move || {
            App::new().app_data(data.clone()).service(
                web::scope("/api")
                    .route("/users", web::get().to(list))
                    .route("/user/{id}", web::get().to(get))
                    .route("/create/user", web::post().to(create))
                    .route("/update/user/{id}", web::put().to(update))
                    .route("/delete/user/{id}", web::delete().to(delete)),
            )
        })
        .workers(1)
        .listen(listener)
        .expect("bind test server")
        .disable_signals()
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let base_url = url::Url::parse(&format!("http://{addr}/api")).expect("base url");
        Self {
            api,
            base_url,
            handle,
        }
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}
