use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use derive_more::From;
use serde::Deserialize;
use tokio::{sync::Mutex, task::JoinError};
use tracing::error;

use crate::{
    api, db, filter,
    lifecycle::{self, Draft, Outcome, SubmitError, ValidationError},
    summary,
    view::{self, CredentialCheck},
};

pub type SharedAppState = Arc<AppState>;

pub struct AppState {
    db_client: db::Client,

    view: Mutex<view::Controller>,

    summary: summary::Requester,
}

impl AppState {
    /// Reads the store once so that a fresh one gets seeded, and restores
    /// the persisted theme.
    pub async fn load(
        db_client: db::Client,
        credentials: impl CredentialCheck + 'static,
        summary: summary::Requester,
    ) -> Result<Self, db::Error> {
        db_client.get_tickets().await?;
        let theme = db_client.get_theme().await?;
        Ok(Self {
            db_client,
            view: Mutex::new(view::Controller::new(credentials, theme)),
            summary,
        })
    }

    async fn is_admin(&self) -> bool {
        self.view.lock().await.is_admin()
    }
}

pub fn router(state: SharedAppState) -> Router {
    Router::new()
        .route("/ticket", get(list_tickets).post(add_ticket))
        .route(
            "/ticket/:id",
            get(get_ticket).put(edit_ticket).delete(delete_ticket),
        )
        .route("/stats", get(ticket_stats))
        .route("/view", get(get_view))
        .route("/view/login-screen", post(open_login))
        .route("/view/back", post(back))
        .route("/view/login", post(login))
        .route("/view/logout", post(logout))
        .route("/view/theme", post(toggle_theme))
        .route("/summary", post(generate_summary))
        .with_state(state)
}

async fn list_tickets(
    State(state): State<SharedAppState>,
    Query(query): Query<filter::Query>,
) -> Result<Json<api::ticket::List>, StoreError> {
    let all = state.db_client.get_tickets().await?;
    Ok(Json(api::ticket::List {
        tickets: filter::apply(&all, &query),
        total_count: all.len(),
    }))
}

async fn ticket_stats(
    State(state): State<SharedAppState>,
) -> Result<Json<api::ticket::Stats>, StoreError> {
    let tickets = state.db_client.get_tickets().await?;
    Ok(Json(filter::Stats::of(&tickets)))
}

async fn get_ticket(
    State(state): State<SharedAppState>,
    Path(id): Path<api::ticket::Id>,
) -> Result<Json<api::Ticket>, GetTicketError> {
    use GetTicketError as E;

    let ticket = state
        .db_client
        .get_ticket_by_id(&id)
        .await?
        .ok_or(E::TicketNotFound)?;
    Ok(Json(ticket))
}

#[derive(Debug, From)]
pub enum StoreError {
    #[from]
    DbError(db::Error),
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        match self {
            Self::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

#[derive(Debug, From)]
pub enum GetTicketError {
    #[from]
    DbError(db::Error),
    TicketNotFound,
}

impl IntoResponse for GetTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::TicketNotFound => StatusCode::NOT_FOUND,
            Self::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddTicketInput {
    #[serde(flatten)]
    draft: Draft,
    /// Answer to "save without a photo?".
    #[serde(default)]
    confirm_without_photo: bool,
}

async fn add_ticket(
    State(state): State<SharedAppState>,
    Json(AddTicketInput {
        draft,
        confirm_without_photo,
    }): Json<AddTicketInput>,
) -> Result<Json<api::Ticket>, SaveTicketError> {
    use SaveTicketError as E;

    if !state.is_admin().await {
        return Err(E::Forbidden);
    }

    let draft = Draft::new(db::ticket::today()).merge(draft);
    match lifecycle::submit(&state.db_client, draft, None, || {
        confirm_without_photo
    })
    .await?
    {
        Outcome::Saved(ticket) => Ok(Json(ticket)),
        Outcome::Declined => Err(E::NotConfirmed),
    }
}

async fn edit_ticket(
    State(state): State<SharedAppState>,
    Path(id): Path<api::ticket::Id>,
    Json(patch): Json<Draft>,
) -> Result<Json<api::Ticket>, SaveTicketError> {
    use SaveTicketError as E;

    if !state.is_admin().await {
        return Err(E::Forbidden);
    }

    let existing = state
        .db_client
        .get_ticket_by_id(&id)
        .await?
        .ok_or(E::TicketNotFound)?;
    let draft = Draft::from(&existing).merge(patch);
    match lifecycle::submit(&state.db_client, draft, Some(&existing), || {
        true
    })
    .await?
    {
        Outcome::Saved(ticket) => Ok(Json(ticket)),
        Outcome::Declined => Err(E::NotConfirmed),
    }
}

#[derive(Deserialize)]
struct DeleteTicketInput {
    #[serde(default)]
    confirm: bool,
}

async fn delete_ticket(
    State(state): State<SharedAppState>,
    Path(id): Path<api::ticket::Id>,
    Query(DeleteTicketInput { confirm }): Query<DeleteTicketInput>,
) -> Result<StatusCode, SaveTicketError> {
    use SaveTicketError as E;

    if !state.is_admin().await {
        return Err(E::Forbidden);
    }

    if lifecycle::delete(&state.db_client, &id, || confirm).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(E::NotConfirmed)
    }
}

#[derive(Debug, From)]
pub enum SaveTicketError {
    #[from]
    DbError(db::Error),
    Forbidden,
    #[from]
    Invalid(ValidationError),
    NotConfirmed,
    TicketNotFound,
}

impl From<SubmitError> for SaveTicketError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Validation(e) => Self::Invalid(e),
            SubmitError::DbError(e) => Self::DbError(e),
            SubmitError::TicketNotFound => Self::TicketNotFound,
        }
    }
}

impl IntoResponse for SaveTicketError {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid(e) => {
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                (status, e.to_string()).into_response()
            }
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
            Self::NotConfirmed => StatusCode::CONFLICT.into_response(),
            Self::TicketNotFound => StatusCode::NOT_FOUND.into_response(),
            Self::DbError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

async fn get_view(
    State(state): State<SharedAppState>,
) -> Json<api::view::State> {
    Json(api::view::State::from(&*state.view.lock().await))
}

async fn open_login(
    State(state): State<SharedAppState>,
) -> Json<api::view::State> {
    let mut view = state.view.lock().await;
    view.open_login();
    Json(api::view::State::from(&*view))
}

async fn back(State(state): State<SharedAppState>) -> Json<api::view::State> {
    let mut view = state.view.lock().await;
    view.back();
    Json(api::view::State::from(&*view))
}

#[derive(Deserialize)]
struct LoginInput {
    password: String,
}

async fn login(
    State(state): State<SharedAppState>,
    Json(LoginInput { password }): Json<LoginInput>,
) -> Result<Json<api::view::State>, LoginError> {
    let mut view = state.view.lock().await;
    view.login(&password)?;
    Ok(Json(api::view::State::from(&*view)))
}

#[derive(Debug, From)]
pub enum LoginError {
    #[from]
    WrongPassword(view::AuthError),
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match self {
            Self::WrongPassword(e) => {
                (StatusCode::FORBIDDEN, e.to_string()).into_response()
            }
        }
    }
}

async fn logout(
    State(state): State<SharedAppState>,
) -> Json<api::view::State> {
    let mut view = state.view.lock().await;
    view.logout();
    Json(api::view::State::from(&*view))
}

async fn toggle_theme(
    State(state): State<SharedAppState>,
) -> Result<Json<api::view::State>, StoreError> {
    let (theme, resp) = {
        let mut view = state.view.lock().await;
        let theme = view.toggle_theme();
        (theme, api::view::State::from(&*view))
    };
    state.db_client.write_theme(theme).await?;
    Ok(Json(resp))
}

async fn generate_summary(
    State(state): State<SharedAppState>,
) -> Result<String, SummaryError> {
    use SummaryError as E;

    let tickets = state.db_client.get_tickets().await?;
    if !state.view.lock().await.begin_summary() {
        return Err(E::InProgress);
    }

    // Runs detached so the in-progress flag is cleared even if the caller
    // goes away before the model answers.
    let task = tokio::spawn({
        let state = Arc::clone(&state);
        async move {
            let summary = state.summary.summarize(&tickets).await;
            state.view.lock().await.finish_summary(summary.clone());
            summary
        }
    });

    match task.await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            error!("summary task failed: {e}");
            let failed = summary::UNAVAILABLE.to_owned();
            state.view.lock().await.finish_summary(failed);
            Err(E::TaskFailed(e))
        }
    }
}

#[derive(Debug, From)]
pub enum SummaryError {
    #[from]
    DbError(db::Error),
    InProgress,
    TaskFailed(JoinError),
}

impl IntoResponse for SummaryError {
    fn into_response(self) -> Response {
        match self {
            Self::InProgress => StatusCode::CONFLICT,
            Self::DbError(_) | Self::TaskFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
        .into_response()
    }
}
