use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::session::AuthReply;
use crate::task::{NewTask, Task, TaskId, TaskUpdate};

/// A remote task service.
///
/// This is implemented by the HTTP [`Client`](crate::client::Client), and by the in-memory
/// [`MockServer`](crate::mock::MockServer) used in tests.
/// Every authorized call takes the session token; an expired or unknown token yields [`ApiError::Unauthorized`].
#[async_trait]
pub trait TaskSource {
    /// Exchange credentials for a session. The token is only present on success
    async fn login(&self, username: &str, password: &str) -> Result<AuthReply, ApiError>;
    /// Create an account. Depending on the server, this may or may not open a session at once
    async fn register(&self, username: &str, password: &str, email: &str) -> Result<AuthReply, ApiError>;
    /// End a session on the server side. Callers should not rely on the result
    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    /// Returns every task of the user, keyed by date key
    async fn list_tasks(&self, token: &str) -> Result<HashMap<String, Vec<Task>>, ApiError>;
    /// Create a task and return it, with its server-assigned ID
    async fn create_task(&self, token: &str, task: &NewTask) -> Result<Task, ApiError>;
    async fn update_task(&self, token: &str, id: TaskId, update: &TaskUpdate) -> Result<(), ApiError>;
    async fn delete_task(&self, token: &str, id: TaskId) -> Result<(), ApiError>;
}
