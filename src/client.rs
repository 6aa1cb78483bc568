//! This module provides a client to connect to the task service over HTTP

use std::collections::HashMap;
use std::error::Error;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;
use crate::session::AuthReply;
use crate::task::{NewTask, Task, TaskId, TaskRecord, TaskUpdate};
use crate::traits::TaskSource;

/// Body of most non-success answers
#[derive(Debug, Default, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
}


/// A [`TaskSource`] that talks to the task service REST API
#[derive(Clone, Debug)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(url: S) -> Result<Self, Box<dyn Error>> {
        let mut base_url = Url::parse(url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(format!("{} cannot be used as a base URL", base_url).into());
        }
        // Make sure endpoints are resolved below the base path, not next to it
        if base_url.path().ends_with('/') == false {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    /// Create a client for the configured [`API_URL`](crate::config::API_URL)
    pub fn from_config() -> Result<Self, Box<dyn Error>> {
        Self::new(crate::config::api_url())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path)
            .map_err(|err| ApiError::InvalidRequest(format!("invalid endpoint {}: {}", path, err)))
    }

    /// Send a request, and sort its failures into the [`ApiError`] taxonomy
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await
            .map_err(|err| ApiError::Connectivity(err.to_string()))?;

        let status = response.status();
        log::debug!("{} {} -> {}", response.url(), status.as_str(), status.canonical_reason().unwrap_or(""));
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<MessageBody>().await {
            Ok(body) if body.message.is_empty() == false => body.message,
            _ => status.canonical_reason().unwrap_or("Request failed").to_string(),
        };
        if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized(message))
        } else {
            Err(ApiError::Rejected { status: status.as_u16(), message })
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response.json::<T>().await
            .map_err(|err| match err.is_decode() {
                true => ApiError::InvalidResponse(err.to_string()),
                false => ApiError::Connectivity(err.to_string()),
            })
    }

    async fn authenticate(&self, path: &str, body: serde_json::Value) -> Result<AuthReply, ApiError> {
        let request = self.http.post(self.endpoint(path)?).json(&body);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl TaskSource for Client {
    async fn login(&self, username: &str, password: &str) -> Result<AuthReply, ApiError> {
        log::debug!("Logging in as {}", username);
        self.authenticate("login", serde_json::json!({ "username": username, "password": password })).await
    }

    async fn register(&self, username: &str, password: &str, email: &str) -> Result<AuthReply, ApiError> {
        log::debug!("Registering {}", username);
        self.authenticate("register", serde_json::json!({ "username": username, "password": password, "email": email })).await
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let request = self.http.post(self.endpoint("logout")?)
            .header(AUTHORIZATION, token);
        self.send(request).await?;
        Ok(())
    }

    async fn list_tasks(&self, token: &str) -> Result<HashMap<String, Vec<Task>>, ApiError> {
        let request = self.http.get(self.endpoint("tasks")?)
            .header(AUTHORIZATION, token);
        let response = self.send(request).await?;
        let records: HashMap<String, Vec<TaskRecord>> = Self::read_json(response).await?;

        let tasks = records.into_iter()
            .map(|(date, records)| (date, records.into_iter().map(Task::from).collect()))
            .collect();
        Ok(tasks)
    }

    async fn create_task(&self, token: &str, task: &NewTask) -> Result<Task, ApiError> {
        let request = self.http.post(self.endpoint("tasks")?)
            .header(AUTHORIZATION, token)
            .json(&task.to_wire());
        let response = self.send(request).await?;
        let record: TaskRecord = Self::read_json(response).await?;
        log::debug!("Created task {} on {}", record.id, record.date);
        Ok(Task::from(record))
    }

    async fn update_task(&self, token: &str, id: TaskId, update: &TaskUpdate) -> Result<(), ApiError> {
        let request = self.http.put(self.endpoint(&format!("tasks/{}", id))?)
            .header(AUTHORIZATION, token)
            .json(update);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_task(&self, token: &str, id: TaskId) -> Result<(), ApiError> {
        let request = self.http.delete(self.endpoint(&format!("tasks/{}", id))?)
            .header(AUTHORIZATION, token);
        self.send(request).await?;
        Ok(())
    }
}
