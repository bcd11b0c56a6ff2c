pub mod session;

use axum::Json;
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Router, extract::State, routing::get};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::models::*;
use crate::services::evaluator::{self, Attention, CourseDay};
use crate::services::export::{self, ExportRow};
use crate::state::AppState;

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/table", get(course_table))
        .route("/status", get(status))
        .route("/board", get(board))
        .route("/export", get(export_courses))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .merge(protected)
        .with_state(state)
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>
) -> Result<Json<LoginResponse>, AppError> {
    if !state.auth.verify(&req.username, &req.password).await {
        return Err(AppError::Unauthorized);
    }
    let token = state.sessions.open().await;
    info!("session opened");
    Ok(Json(LoginResponse { token }))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = session::bearer_token(&headers) {
        state.sessions.close(token).await;
    }
    StatusCode::NO_CONTENT
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.store.load_all().await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = state.store.save(req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn course_table(State(state): State<AppState>) -> Result<Json<Vec<ExportRow>>, AppError> {
    let courses = state.store.load_all().await?;
    Ok(Json(export::flatten(&courses)))
}

async fn status(State(state): State<AppState>) -> Result<Json<Attention>, AppError> {
    let courses = state.store.load_all().await?;
    Ok(Json(evaluator::partition(&courses, local_now())))
}

async fn board(State(state): State<AppState>) -> Result<Json<Vec<CourseDay>>, AppError> {
    let courses = state.store.load_all().await?;
    Ok(Json(evaluator::live_board(&courses, local_now())))
}

async fn export_courses(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let courses = state.store.load_all().await?;
    let body = export::export_csv(&courses)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"courses.csv\""),
        ],
        body,
    ))
}
