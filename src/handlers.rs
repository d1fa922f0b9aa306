use crate::errors::AppError;
use crate::form::StudentForm;
use crate::models::{
    AnalyticsResponse, SearchQuery, SettingsRequest, SheetConfig, StatusResponse, Student,
    StudentListResponse, View, ViewRequest,
};
use crate::settings::{APPS_SCRIPT_TEMPLATE, SettingsPanel};
use crate::state::AppState;
use crate::table::filter_students;
use crate::ui::{render_analytics, render_entry, render_list, render_page, render_settings};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};

pub async fn index(State(state): State<AppState>, Query(search): Query<SearchQuery>) -> Html<String> {
    let (view, loading, students, config) = {
        let shell = state.shell.lock().await;
        (
            shell.view(),
            shell.is_loading(),
            shell.students().to_vec(),
            shell.config().clone(),
        )
    };

    let content = match view {
        View::Entry => render_entry(),
        View::List => render_list(&students, &search.q, state.display_offset),
        View::Analytics => render_analytics(&state.analytics().await),
        View::Settings => render_settings(&SettingsPanel::seeded(&config)),
    };
    Html(render_page(view, loading, content))
}

pub async fn switch_view(
    State(state): State<AppState>,
    Form(payload): Form<ViewRequest>,
) -> Result<Redirect, AppError> {
    let view = View::parse(&payload.view)
        .ok_or_else(|| AppError::bad_request("view must be one of entry, list, analytics, settings"))?;
    state.shell.lock().await.set_view(view);
    Ok(Redirect::to("/"))
}

/// Incomplete submissions are ignored and the page is shown again.
pub async fn submit_student(State(state): State<AppState>, Form(mut form): Form<StudentForm>) -> Redirect {
    if let Some(draft) = form.submit() {
        state.add_student(draft).await;
    }
    Redirect::to("/")
}

pub async fn delete_student(State(state): State<AppState>, Path(id): Path<String>) -> Redirect {
    state.delete_student(&id).await;
    Redirect::to("/")
}

pub async fn refresh(State(state): State<AppState>) -> Redirect {
    state.trigger_refresh().await;
    Redirect::to("/")
}

pub async fn save_settings(
    State(state): State<AppState>,
    Form(payload): Form<SettingsRequest>,
) -> Result<Redirect, AppError> {
    let panel = SettingsPanel {
        input_url: payload.url,
    };
    state.save_settings(panel.save()).await?;
    Ok(Redirect::to("/"))
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.status().await)
}

pub async fn list_students(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
) -> Json<StudentListResponse> {
    let shell = state.shell.lock().await;
    let students: Vec<Student> = filter_students(shell.students(), &search.q)
        .into_iter()
        .cloned()
        .collect();

    Json(StudentListResponse {
        visible: students.len(),
        students,
    })
}

pub async fn create_student(
    State(state): State<AppState>,
    Json(mut form): Json<StudentForm>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let draft = form
        .submit()
        .ok_or_else(|| AppError::bad_request("fullName, className and birthDate are required"))?;
    let student = state.add_student(draft).await;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn remove_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.delete_student(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no student with id {id}")))
    }
}

pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsResponse> {
    Json(state.analytics().await)
}

pub async fn get_settings(State(state): State<AppState>) -> Json<SheetConfig> {
    Json(state.shell.lock().await.config().clone())
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(payload): Json<SettingsRequest>,
) -> Result<Json<SheetConfig>, AppError> {
    let config = SettingsPanel {
        input_url: payload.url,
    }
    .save();
    state.save_settings(config.clone()).await?;
    Ok(Json(config))
}

pub async fn apps_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        APPS_SCRIPT_TEMPLATE,
    )
}
