//! An in-memory task service, that behaves like the real REST API.
//!
//! This is mostly useful for tests: it lets the [`App`](crate::app::App) run its whole flow without a network.
//! It is only built with the `mock_server` feature.
#![cfg(feature = "mock_server")]

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ApiError;
use crate::mock_behaviour::{MockBehaviour, Operation};
use crate::session::AuthReply;
use crate::task::{NewTask, Task, TaskId, TaskRecord, TaskUpdate};
use crate::traits::TaskSource;

#[derive(Clone, Debug)]
struct MockUser {
    password: String,
    email: String,
}

#[derive(Debug, Default)]
struct ServerState {
    users: HashMap<String, MockUser>,
    /// token -> username
    sessions: HashMap<String, String>,
    /// Every task, along with its owner
    tasks: Vec<(String, TaskRecord)>,
    last_id: TaskId,
    tokens_on_register: bool,
}

impl ServerState {
    fn owner(&self, token: &str) -> Result<String, ApiError> {
        self.sessions.get(token)
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }

    fn open_session(&mut self, username: &str) -> String {
        let token = Uuid::new_v4().to_hyphenated().to_string();
        self.sessions.insert(token.clone(), username.to_string());
        token
    }
}


/// A [`TaskSource`] that keeps everything in memory
#[derive(Debug, Default)]
pub struct MockServer {
    state: Mutex<ServerState>,
    behaviour: Mutex<MockBehaviour>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account
    pub fn with_user(self, username: &str, password: &str, email: &str) -> Self {
        self.state().users.insert(username.to_string(), MockUser {
            password: password.to_string(),
            email: email.to_string(),
        });
        self
    }

    /// Whether a successful registration also logs the new user in (the real server does not)
    pub fn with_tokens_on_register(self, enabled: bool) -> Self {
        self.state().tokens_on_register = enabled;
        self
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        *self.behaviour() = behaviour;
    }

    /// Invalidate every session, as a server restart would
    pub fn expire_sessions(&self) {
        self.state().sessions.clear();
    }

    /// Log a user in without going through [`TaskSource::login`]
    pub fn open_session(&self, username: &str) -> String {
        self.state().open_session(username)
    }

    pub fn active_sessions(&self) -> usize {
        self.state().sessions.len()
    }

    /// Every task of a user, in creation order
    pub fn tasks_of(&self, username: &str) -> Vec<TaskRecord> {
        self.state().tasks.iter()
            .filter(|(owner, _)| owner == username)
            .map(|(_, record)| record.clone())
            .collect()
    }

    /// Insert a task as if another client created it
    pub fn insert_task(&self, username: &str, task: &NewTask) -> TaskId {
        let mut state = self.state();
        state.last_id += 1;
        let wire = task.to_wire();
        let record = TaskRecord {
            id: state.last_id,
            date: wire.date,
            text: wire.text,
            group_name: wire.group_name,
            completed: wire.completed,
        };
        let id = record.id;
        state.tasks.push((username.to_string(), record));
        id
    }

    fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn behaviour(&self) -> MutexGuard<'_, MockBehaviour> {
        self.behaviour.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TaskSource for MockServer {
    async fn login(&self, username: &str, password: &str) -> Result<AuthReply, ApiError> {
        self.behaviour().check(Operation::Login)?;
        let mut state = self.state();
        let known = state.users.get(username).map(|user| user.password == password).unwrap_or(false);
        if known == false {
            return Err(ApiError::Unauthorized("Invalid username or password".to_string()));
        }

        let token = state.open_session(username);
        Ok(AuthReply {
            message: "Login successful".to_string(),
            token: Some(token),
            username: Some(username.to_string()),
        })
    }

    async fn register(&self, username: &str, password: &str, email: &str) -> Result<AuthReply, ApiError> {
        self.behaviour().check(Operation::Register)?;
        if username.is_empty() || password.is_empty() || email.is_empty() {
            return Err(ApiError::Rejected { status: 400, message: "Username, password, and email are required".to_string() });
        }

        let mut state = self.state();
        let taken = state.users.iter().any(|(name, user)| name == username || user.email == email);
        if taken {
            return Err(ApiError::Rejected { status: 409, message: "Username or email already exists".to_string() });
        }
        state.users.insert(username.to_string(), MockUser { password: password.to_string(), email: email.to_string() });

        let mut reply = AuthReply { message: "User registered successfully".to_string(), token: None, username: None };
        if state.tokens_on_register {
            reply.token = Some(state.open_session(username));
            reply.username = Some(username.to_string());
        }
        Ok(reply)
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.behaviour().check(Operation::Logout)?;
        match self.state().sessions.remove(token) {
            Some(_) => Ok(()),
            None => Err(ApiError::Unauthorized("Invalid token".to_string())),
        }
    }

    async fn list_tasks(&self, token: &str) -> Result<HashMap<String, Vec<Task>>, ApiError> {
        self.behaviour().check(Operation::ListTasks)?;
        let state = self.state();
        let owner = state.owner(token)?;

        let mut records: Vec<&TaskRecord> = state.tasks.iter()
            .filter(|(o, _)| *o == owner)
            .map(|(_, record)| record)
            .collect();
        records.sort_by(|a, b| a.group_name.cmp(&b.group_name).then(a.id.cmp(&b.id)));

        let mut by_date: HashMap<String, Vec<Task>> = HashMap::new();
        for record in records {
            by_date.entry(record.date.clone())
                .or_insert_with(Vec::new)
                .push(Task::from(record.clone()));
        }
        Ok(by_date)
    }

    async fn create_task(&self, token: &str, task: &NewTask) -> Result<Task, ApiError> {
        self.behaviour().check(Operation::CreateTask)?;
        let owner = self.state().owner(token)?;
        let id = self.insert_task(&owner, task);

        let state = self.state();
        match state.tasks.iter().find(|(_, record)| record.id == id) {
            Some((_, record)) => Ok(Task::from(record.clone())),
            None => Err(ApiError::InvalidResponse(format!("task {} vanished", id))),
        }
    }

    async fn update_task(&self, token: &str, id: TaskId, update: &TaskUpdate) -> Result<(), ApiError> {
        self.behaviour().check(Operation::UpdateTask)?;
        let mut state = self.state();
        let owner = state.owner(token)?;

        // Like the real server, unknown IDs are silently ignored
        if let Some((_, record)) = state.tasks.iter_mut().find(|(o, record)| *o == owner && record.id == id) {
            if let Some(text) = &update.text {
                record.text = text.clone();
            }
            if let Some(completed) = update.completed {
                record.completed = completed;
            }
        }
        Ok(())
    }

    async fn delete_task(&self, token: &str, id: TaskId) -> Result<(), ApiError> {
        self.behaviour().check(Operation::DeleteTask)?;
        let mut state = self.state();
        let owner = state.owner(token)?;
        state.tasks.retain(|(o, record)| !(*o == owner && record.id == id));
        Ok(())
    }
}
