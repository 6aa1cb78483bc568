//! This crate provides a client for a task calendar service.
//!
//! The service stores, for each user, a list of tasks filed under calendar days. This crate fetches them with an HTTP
//! [`client`], keeps a local copy in a [`store`], and renders them either as a month grid ([`calendar`]) or as the task
//! list of a single day ([`day`]).
//!
//! All of this is tied together by the [`App`](app::App) state object, which any front end (see the `taskgrid`
//! binary) can drive and render. The remote service is abstracted behind the [`TaskSource`](traits::TaskSource) trait,
//! so that the app can run against an in-memory `mock::MockServer` as well (`mock_server` feature, on by default).

pub mod traits;

pub mod config;
pub mod date;
pub mod error;
pub use error::ApiError;
pub mod session;
pub use session::{Session, SessionStore};
pub mod task;
pub use task::{NewTask, Task, TaskId, TaskKind};

pub mod client;
pub mod mock;
pub mod mock_behaviour;
pub mod store;
pub use store::TaskStore;

pub mod day;
pub mod calendar;
pub mod view;
pub mod app;
pub use app::App;
