//! Test utilities for the client crate.
//!
//! Scripted port doubles shared by unit tests (in `src/`) and integration
//! tests (in `tests/`). Compiled for tests and behind the `test-support`
//! feature.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::controllers::ControllerPorts;
use crate::domain::ports::{Notifier, Sleeper, UserApi, UserApiError};
use crate::domain::{Notification, NotificationKind, User, UserDraft, UserId};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{what} mutex poisoned"),
    }
}

/// Build a user record from literal values.
pub fn user(id: &str, name: &str, email: &str, address: &str) -> User {
    let id = match UserId::new(id) {
        Ok(id) => id,
        Err(error) => panic!("fixture user id must be valid: {error}"),
    };
    User::new(id, UserDraft::new(name, email, address))
}

/// Build a user id from a literal.
pub fn user_id(id: &str) -> UserId {
    match UserId::new(id) {
        Ok(id) => id,
        Err(error) => panic!("fixture user id must be valid: {error}"),
    }
}

/// One call observed by [`ScriptedUserApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET /users`.
    List,
    /// `GET /user/{id}`.
    Get(UserId),
    /// `POST /create/user`.
    Create(UserDraft),
    /// `PUT /update/user/{id}`.
    Update(UserId, UserDraft),
    /// `DELETE /delete/user/{id}`.
    Delete(UserId),
}

#[derive(Default)]
struct Script {
    list: VecDeque<Result<Vec<User>, UserApiError>>,
    get: VecDeque<Result<User, UserApiError>>,
    create: VecDeque<Result<Option<User>, UserApiError>>,
    update: VecDeque<Result<User, UserApiError>>,
    delete: VecDeque<Result<(), UserApiError>>,
}

fn unscripted(operation: &str) -> UserApiError {
    UserApiError::server(599_u16, Some(format!("unscripted {operation} call")))
}

/// User API double replaying queued responses and recording every call.
///
/// With [`Self::yielding`] each call yields to the executor once before
/// answering, which leaves the request observably in flight for other
/// futures polled by the same task.
#[derive(Default)]
pub struct ScriptedUserApi {
    script: Mutex<Script>,
    calls: Mutex<Vec<ApiCall>>,
    yield_before_response: bool,
}

impl ScriptedUserApi {
    /// Double that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Double that yields once before answering each call.
    pub fn yielding() -> Self {
        Self {
            yield_before_response: true,
            ..Self::default()
        }
    }

    /// Queue a response for the next `list_users` call.
    pub fn push_list(&self, response: Result<Vec<User>, UserApiError>) -> &Self {
        lock(&self.script, "script").list.push_back(response);
        self
    }

    /// Queue a response for the next `get_user` call.
    pub fn push_get(&self, response: Result<User, UserApiError>) -> &Self {
        lock(&self.script, "script").get.push_back(response);
        self
    }

    /// Queue a response for the next `create_user` call.
    pub fn push_create(&self, response: Result<User, UserApiError>) -> &Self {
        lock(&self.script, "script")
            .create
            .push_back(response.map(Some));
        self
    }

    /// Queue a successful `create_user` answer that carries no record.
    pub fn push_create_without_record(&self) -> &Self {
        lock(&self.script, "script").create.push_back(Ok(None));
        self
    }

    /// Queue a response for the next `update_user` call.
    pub fn push_update(&self, response: Result<User, UserApiError>) -> &Self {
        lock(&self.script, "script").update.push_back(response);
        self
    }

    /// Queue a response for the next `delete_user` call.
    pub fn push_delete(&self, response: Result<(), UserApiError>) -> &Self {
        lock(&self.script, "script").delete.push_back(response);
        self
    }

    /// Calls observed so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls, "calls").clone()
    }

    /// Number of observed calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&ApiCall) -> bool) -> usize {
        lock(&self.calls, "calls")
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    async fn record(&self, call: ApiCall) {
        lock(&self.calls, "calls").push(call);
        if self.yield_before_response {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl UserApi for ScriptedUserApi {
    async fn list_users(&self) -> Result<Vec<User>, UserApiError> {
        self.record(ApiCall::List).await;
        lock(&self.script, "script")
            .list
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("list")))
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserApiError> {
        self.record(ApiCall::Get(id.clone())).await;
        lock(&self.script, "script")
            .get
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("get")))
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<Option<User>, UserApiError> {
        self.record(ApiCall::Create(draft.clone())).await;
        lock(&self.script, "script")
            .create
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("create")))
    }

    async fn update_user(&self, id: &UserId, draft: &UserDraft) -> Result<User, UserApiError> {
        self.record(ApiCall::Update(id.clone(), draft.clone())).await;
        lock(&self.script, "script")
            .update
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("update")))
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserApiError> {
        self.record(ApiCall::Delete(id.clone())).await;
        lock(&self.script, "script")
            .delete
            .pop_front()
            .unwrap_or_else(|| Err(unscripted("delete")))
    }
}

/// Notifier double that records every notification.
#[derive(Debug, Default)]
pub struct RecordingNotifier(Mutex<Vec<Notification>>);

impl RecordingNotifier {
    /// Notifications observed so far, in order.
    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.0, "notifier").clone()
    }

    /// Messages of the observed notifications of `kind`.
    pub fn messages(&self, kind: NotificationKind) -> Vec<String> {
        lock(&self.0, "notifier")
            .iter()
            .filter(|notification| notification.kind() == kind)
            .map(|notification| notification.message().to_owned())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        lock(&self.0, "notifier").push(notification);
    }
}

/// Sleeper double that returns immediately and records requested delays.
#[derive(Debug, Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    /// Delays requested so far, in order.
    pub fn durations(&self) -> Vec<Duration> {
        lock(&self.0, "sleeper").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0, "sleeper").push(duration);
    }
}

/// Clock double whose time only moves when told to.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *lock(&self.0, "clock") += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0, "clock")
    }
}

/// Scripted API, recording notifier and recording sleeper wired together.
pub struct Harness {
    /// Scripted API double.
    pub api: Arc<ScriptedUserApi>,
    /// Recording notifier double.
    pub notifier: Arc<RecordingNotifier>,
    /// Recording sleeper double.
    pub sleeper: Arc<RecordingSleeper>,
}

impl Harness {
    /// Harness whose API answers immediately.
    pub fn new() -> Self {
        Self::with_api(ScriptedUserApi::new())
    }

    /// Harness whose API yields once before each answer.
    pub fn yielding() -> Self {
        Self::with_api(ScriptedUserApi::yielding())
    }

    fn with_api(api: ScriptedUserApi) -> Self {
        Self {
            api: Arc::new(api),
            notifier: Arc::new(RecordingNotifier::default()),
            sleeper: Arc::new(RecordingSleeper::default()),
        }
    }

    /// Controller ports backed by the doubles.
    pub fn ports(&self) -> ControllerPorts {
        ControllerPorts::new(
            self.api.clone(),
            self.notifier.clone(),
            self.sleeper.clone(),
        )
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
