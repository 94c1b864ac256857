use crate::errors::AppError;
use crate::models::{
    resolve_subject, subject_options, today, NewSession, NewSubject, Session, SessionForm, Subject,
};
use crate::nav::Mode;
use crate::state::AppState;
use crate::storage::{Collection, Record};
use crate::ui::{self, Notice};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use tracing::{info, warn};

pub async fn index() -> Redirect {
    Redirect::to(Mode::default().path())
}

pub async fn add_subject_page() -> Html<String> {
    Html(ui::render_add_subject(None))
}

pub async fn add_subject(
    State(state): State<AppState>,
    Form(form): Form<NewSubject>,
) -> Result<(StatusCode, Html<String>), AppError> {
    match form.validate() {
        Ok(subject) => {
            insert_subject(&state, &subject).await?;
            let notice = Notice::success(format!("Subject {} added successfully!", subject.name));
            Ok((StatusCode::OK, Html(ui::render_add_subject(Some(&notice)))))
        }
        Err(message) => {
            warn!("subject rejected: {message}");
            let notice = Notice::error(message);
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(ui::render_add_subject(Some(&notice))),
            ))
        }
    }
}

pub async fn add_session_page(State(state): State<AppState>) -> Html<String> {
    let subjects = state.store.all(Collection::Subjects).await;
    let options = subject_options(&subjects);
    Html(ui::render_add_session(&options, today(), None))
}

pub async fn add_session(
    State(state): State<AppState>,
    Form(form): Form<SessionForm>,
) -> Result<Html<String>, AppError> {
    let subjects = state.store.all(Collection::Subjects).await;
    let options = subject_options(&subjects);
    if options.is_empty() {
        return Ok(Html(ui::render_add_session(&options, today(), None)));
    }

    let Some(selected) = resolve_subject(&options, &form.subject) else {
        return Err(AppError::bad_request(format!(
            "unknown subject '{}'",
            form.subject
        )));
    };

    let session = Session {
        subject_id: selected.subject_id.clone(),
        session_date: form.session_date,
        condition: form.condition,
        notes: form.notes,
    };
    insert_session(&state, &session).await?;

    let notice = Notice::success("Session logged successfully!");
    Ok(Html(ui::render_add_session(&options, today(), Some(&notice))))
}

pub async fn view_subjects(State(state): State<AppState>) -> Html<String> {
    let subjects = state.store.all(Collection::Subjects).await;
    Html(ui::render_subjects(&subjects))
}

pub async fn view_sessions(State(state): State<AppState>) -> Html<String> {
    let sessions = state.store.all(Collection::Sessions).await;
    Html(ui::render_sessions(&sessions))
}

pub async fn list_subjects(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.store.all(Collection::Subjects).await)
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.store.all(Collection::Sessions).await)
}

pub async fn create_subject(
    State(state): State<AppState>,
    Json(payload): Json<NewSubject>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let subject = payload.validate().map_err(AppError::bad_request)?;
    let record = insert_subject(&state, &subject).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `subject_id` is stored as given, whether or not such a subject exists.
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<NewSession>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    let session = Session::from(payload);
    let record = insert_session(&state, &session).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn insert_subject(state: &AppState, subject: &Subject) -> Result<Record, AppError> {
    let record = subject.to_record();
    let doc_id = state.store.insert(Collection::Subjects, record.clone()).await?;
    info!(doc_id, id = %subject.id, "subject added");
    Ok(record)
}

async fn insert_session(state: &AppState, session: &Session) -> Result<Record, AppError> {
    let record = session.to_record();
    let doc_id = state.store.insert(Collection::Sessions, record.clone()).await?;
    info!(doc_id, subject_id = %session.subject_id, "session logged");
    Ok(record)
}
