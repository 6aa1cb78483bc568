//! The application state, and every user action that changes it
//!
//! [`App`] owns the session, the [`TaskStore`] and the [`ViewState`]. User actions are `async` methods: each one
//! issues its request(s) through a [`TaskSource`], refetches the whole task list after a successful mutation, and
//! records what should be shown to the user. [`App::render`] then turns the current state into a [`Screen`].

use chrono::NaiveDate;

use crate::calendar::{render_month, MonthGrid};
use crate::date::{day_header, to_local_date_key};
use crate::day::{self, render_day, DayList, EditAction};
use crate::error::ApiError;
use crate::session::{AuthReply, Session, SessionStore};
use crate::store::TaskStore;
use crate::task::TaskId;
use crate::traits::TaskSource;
use crate::view::{Refresh, ViewMode, ViewState};

/// Shown in place of the tasks when they cannot be fetched
pub const FETCH_FAILED_MESSAGE: &str = "Could not connect to the backend or session expired. Please log in again.";
/// Shown on the login form after a forced logout
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    /// Progress or success
    Info,
    Error,
}

/// A message shown next to a form or above a view
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info<S: ToString>(text: S) -> Self {
        Self { kind: NoticeKind::Info, text: text.to_string() }
    }

    pub fn error<S: ToString>(text: S) -> Self {
        Self { kind: NoticeKind::Error, text: text.to_string() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthForm {
    Login,
    Register,
}

/// The login/registration screen
#[derive(Clone, Debug, PartialEq)]
pub struct AuthScreen {
    pub form: AuthForm,
    pub login_message: Option<Notice>,
    pub register_message: Option<Notice>,
}

impl Default for AuthScreen {
    fn default() -> Self {
        Self { form: AuthForm::Login, login_message: None, register_message: None }
    }
}

/// The single-day view
#[derive(Clone, Debug, PartialEq)]
pub struct DayPage {
    /// e.g. `16 Oct, Fri`
    pub header: String,
    pub tasks: DayList,
}

/// What is on screen
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Auth(AuthScreen),
    Calendar(MonthGrid),
    Day(DayPage),
}


/// The whole client state
pub struct App<S: TaskSource> {
    source: S,
    sessions: SessionStore,
    session: Session,
    tasks: TaskStore,
    view: ViewState,
    today: NaiveDate,
    auth: AuthScreen,
    /// Error shown above the authenticated views
    banner: Option<Notice>,
    /// Date key whose trailing input has the keyboard focus
    focus: Option<String>,
}

impl<S: TaskSource> App<S> {
    /// Create the app, restoring whatever session `sessions` holds. Nothing is fetched until [`App::start`]
    pub fn new(source: S, sessions: SessionStore, today: NaiveDate) -> Self {
        let session = sessions.load();
        Self {
            source,
            sessions,
            session,
            tasks: TaskStore::new(),
            view: ViewState::starting_at(today),
            today,
            auth: AuthScreen::default(),
            banner: None,
            focus: None,
        }
    }

    pub fn source(&self) -> &S              { &self.source }
    pub fn session(&self) -> &Session       { &self.session }
    pub fn tasks(&self) -> &TaskStore       { &self.tasks }
    pub fn view(&self) -> &ViewState        { &self.view }
    pub fn auth_screen(&self) -> &AuthScreen { &self.auth }
    pub fn banner(&self) -> Option<&Notice> { self.banner.as_ref() }
    pub fn today(&self) -> NaiveDate        { self.today }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Show the authenticated views if a stored session exists, the login form otherwise
    pub async fn start(&mut self) {
        if self.is_authenticated() {
            log::info!("Resuming session of {}", self.session.username().unwrap_or_default());
            if let Err(err) = self.refresh().await {
                log::debug!("Initial fetch failed: {}", err);
            }
        } else {
            self.auth = AuthScreen::default();
        }
    }

    /// Move to a new day, e.g. when the app stays open past midnight
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }


    //
    // Authentication
    //

    pub fn show_login_form(&mut self) {
        self.auth = AuthScreen { form: AuthForm::Login, ..AuthScreen::default() };
    }

    pub fn show_register_form(&mut self) {
        self.auth = AuthScreen { form: AuthForm::Register, ..AuthScreen::default() };
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        self.auth.login_message = Some(Notice::info("Logging in..."));
        let result = self.source.login(username, password).await;
        match result {
            Ok(reply) => {
                self.auth.login_message = Some(Notice::info(&reply.message));
                self.open_session(&reply, username).await
            },
            Err(err) => {
                log::warn!("Login failed: {}", err);
                self.auth.login_message = Some(Notice::error(err.user_message()));
                Err(err)
            },
        }
    }

    pub async fn register(&mut self, username: &str, password: &str, email: &str) -> Result<(), ApiError> {
        self.auth.register_message = Some(Notice::info("Registering..."));
        let result = self.source.register(username, password, email).await;
        match result {
            Ok(reply) => {
                self.auth.register_message = Some(Notice::info(&reply.message));
                self.open_session(&reply, username).await
            },
            Err(err) => {
                log::warn!("Registration failed: {}", err);
                self.auth.register_message = Some(Notice::error(err.user_message()));
                Err(err)
            },
        }
    }

    /// Replies without a token (e.g. after registering on some servers) leave the auth screen up
    async fn open_session(&mut self, reply: &AuthReply, typed_username: &str) -> Result<(), ApiError> {
        let session = match reply.session(typed_username) {
            None => return Ok(()),
            Some(s) => s,
        };

        log::info!("Logged in as {}", session.username().unwrap_or_default());
        if let Err(err) = self.sessions.save(&session) {
            log::warn!("Unable to persist the session: {}", err);
        }
        self.session = session;
        self.banner = None;
        self.refresh().await
    }

    /// End the session. The local session is cleared whatever the server answers
    pub async fn logout(&mut self) {
        if let Some(token) = self.session.token.clone() {
            if let Err(err) = self.source.logout(&token).await {
                log::warn!("Server-side logout failed ({}). Clearing the local session anyway", err);
            }
        }
        self.end_session();
        self.auth = AuthScreen::default();
        log::info!("Logged out");
    }

    fn end_session(&mut self) {
        if let Err(err) = self.sessions.clear() {
            log::warn!("Unable to erase the persisted session: {}", err);
        }
        self.session = Session::default();
        self.tasks.clear();
        self.banner = None;
        self.focus = None;
        self.view = ViewState::starting_at(self.today);
    }

    fn force_logout(&mut self) {
        log::warn!("The server rejected our session, logging out");
        self.end_session();
        self.auth = AuthScreen {
            login_message: Some(Notice::error(SESSION_EXPIRED_MESSAGE)),
            ..AuthScreen::default()
        };
    }

    fn token(&mut self) -> Result<String, ApiError> {
        match (self.session.token.clone(), self.is_authenticated()) {
            (Some(token), true) => Ok(token),
            _ => {
                self.force_logout();
                Err(ApiError::Unauthorized("Not logged in".to_string()))
            },
        }
    }

    /// Record a failed authorized call: an authorization failure ends the session, anything else is shown in the banner
    fn fail(&mut self, err: ApiError, banner_text: Option<&str>) -> ApiError {
        if err.is_unauthorized() {
            self.force_logout();
        } else {
            log::warn!("Request failed: {}", err);
            let text = banner_text.map(String::from).unwrap_or_else(|| err.user_message());
            self.banner = Some(Notice::error(text));
        }
        err
    }


    //
    // Tasks
    //

    /// Replace the task store with a fresh copy from the server.
    /// On failure, the store keeps its previous content
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let token = self.token()?;
        let ticket = self.tasks.begin_fetch();
        let result = self.source.list_tasks(&token).await;
        match result {
            Ok(tasks) => {
                self.tasks.apply(ticket, tasks);
                self.banner = None;
                log::debug!("{} tasks loaded", self.tasks.len());
                Ok(())
            },
            Err(err) => Err(self.fail(err, Some(FETCH_FAILED_MESSAGE))),
        }
    }

    /// Flip the completion of a task, then refetch. Group headers have no checkbox and are left alone
    pub async fn toggle_task(&mut self, id: TaskId) -> Result<(), ApiError> {
        let update = match self.tasks.find(id).map(day::toggle) {
            None => {
                log::warn!("No task with ID {}", id);
                return Ok(());
            },
            Some(None) => return Ok(()),
            Some(Some(update)) => update,
        };

        let token = self.token()?;
        self.focus = None;
        let result = self.source.update_task(&token, id, &update).await;
        if let Err(err) = result {
            return Err(self.fail(err, None));
        }
        self.refresh().await
    }

    /// Commit the edited text of a task: blank text deletes it, new text renames it, same text does nothing.
    /// Group headers are not editable and are left alone
    pub async fn commit_edit(&mut self, id: TaskId, input: &str) -> Result<(), ApiError> {
        let action = match self.tasks.find(id) {
            None => {
                log::warn!("No task with ID {}", id);
                return Ok(());
            },
            Some(task) => day::commit_edit(task, input),
        };

        let token = self.token()?;
        let result = match &action {
            EditAction::Nothing => return Ok(()),
            EditAction::Delete(id) => self.source.delete_task(&token, *id).await,
            EditAction::Update(id, update) => self.source.update_task(&token, *id, update).await,
        };
        self.focus = None;
        if let Err(err) = result {
            return Err(self.fail(err, None));
        }
        self.refresh().await
    }

    /// Handle a confirmed trailing input of the list of `date_key`.
    ///
    /// Once the task is created and the list refetched, the trailing input of that same day gets the focus back.
    pub async fn submit_new_task(&mut self, date_key: &str, input: &str) -> Result<(), ApiError> {
        let list = self.day_list(date_key);
        let new_task = match day::new_task_from_input(date_key, input, list.current_group()) {
            None => return Ok(()),
            Some(t) => t,
        };

        let token = self.token()?;
        let result = self.source.create_task(&token, &new_task).await;
        if let Err(err) = result {
            return Err(self.fail(err, None));
        }
        self.refresh().await?;
        self.focus = Some(date_key.to_string());
        Ok(())
    }

    /// The digest of the tasks still to do on `date_key`
    pub fn pending_digest(&self, date_key: &str) -> Option<String> {
        let username = self.session.username().unwrap_or("there");
        day::pending_digest(date_key, username, self.tasks.day(date_key))
    }


    //
    // Navigation
    //

    pub fn switch_to_calendar(&mut self) {
        self.apply_render_only(|view| view.switch_to_calendar());
    }

    pub fn switch_to_day(&mut self) {
        self.apply_render_only(|view| view.switch_to_day());
    }

    pub fn focus_day(&mut self, day: NaiveDate) {
        self.apply_render_only(|view| view.focus_day(day));
    }

    pub async fn next_month(&mut self) -> Result<(), ApiError> {
        let refresh = self.view.next_month();
        self.after_transition(refresh).await
    }

    pub async fn prev_month(&mut self) -> Result<(), ApiError> {
        let refresh = self.view.prev_month();
        self.after_transition(refresh).await
    }

    fn apply_render_only<F: FnOnce(&mut ViewState) -> Refresh>(&mut self, transition: F) {
        if transition(&mut self.view) == Refresh::Refetch {
            log::debug!("Unexpected refetch request from a view switch");
        }
        self.focus = None;
    }

    async fn after_transition(&mut self, refresh: Refresh) -> Result<(), ApiError> {
        self.focus = None;
        match refresh {
            Refresh::Render => Ok(()),
            Refresh::Refetch => self.refresh().await,
        }
    }


    //
    // Rendering
    //

    /// The rendered task list of a day, from the current store content
    pub fn day_list(&self, date_key: &str) -> DayList {
        let focused = self.focus.as_deref() == Some(date_key);
        render_day(date_key, self.tasks.day(date_key), focused)
    }

    pub fn render(&self) -> Screen {
        if self.is_authenticated() == false {
            return Screen::Auth(self.auth.clone());
        }

        let today_key = to_local_date_key(&self.today);
        match self.view.mode() {
            ViewMode::Calendar => Screen::Calendar(
                render_month(self.view.focused_month(), &today_key, &self.tasks, self.focus.as_deref())
            ),
            ViewMode::Day => {
                let day = self.view.focused_day();
                Screen::Day(DayPage {
                    header: day_header(&day),
                    tasks: self.day_list(&to_local_date_key(&day)),
                })
            },
        }
    }
}
