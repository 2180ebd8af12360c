use axum::Json;
use axum::extract::State;
use questline_core::{CourseId, now_ms};
use questline_protocol::{CourseRecord, CreateCourseRequest};
use rusqlite::{Connection, OptionalExtension, params};

use crate::db::role_from_db;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<Json<CourseRecord>, ApiError> {
    let name = request.name.trim();
    if name.is_empty() || name.len() > 200 {
        return Err(ApiError::bad_request("name must be between 1 and 200 characters"));
    }

    let db = state.db.lock().await;

    let role: Option<String> = db
        .query_row("SELECT role FROM users WHERE id = ?1", params![request.lecturer_id], |row| {
            row.get(0)
        })
        .optional()?;
    let Some(role) = role else {
        return Err(ApiError::not_found("lecturer not found"));
    };
    if !role_from_db(&role).can_author_courses() {
        return Err(ApiError::bad_request("user must be a lecturer or admin to create courses"));
    }

    let course_id = CourseId::new().to_string();
    let now = now_ms();
    db.execute(
        "
        INSERT INTO courses (id, name, description, lecturer_id, created_at_ms, updated_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ",
        params![course_id, name, request.description, request.lecturer_id, now, now],
    )?;

    let course = fetch_course(&db, &course_id)?
        .ok_or_else(|| ApiError::internal("failed to reload course after creation"))?;
    Ok(Json(course))
}

pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<CourseRecord>>, ApiError> {
    let db = state.db.lock().await;
    Ok(Json(query_courses(&db)?))
}

fn query_courses(conn: &Connection) -> Result<Vec<CourseRecord>, ApiError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, name, description, lecturer_id, created_at_ms, updated_at_ms
        FROM courses
        ORDER BY created_at_ms
        ",
    )?;
    let rows = stmt.query_map([], map_course_row)?;
    Ok(rows.filter_map(Result::ok).collect())
}

fn fetch_course(conn: &Connection, course_id: &str) -> Result<Option<CourseRecord>, ApiError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, name, description, lecturer_id, created_at_ms, updated_at_ms
        FROM courses WHERE id = ?1
        ",
    )?;

    let mut rows = stmt.query(params![course_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(map_course_row(row)?));
    }
    Ok(None)
}

fn map_course_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CourseRecord> {
    Ok(CourseRecord {
        course_id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        lecturer_id: row.get(3)?,
        created_at_ms: row.get::<_, i64>(4)? as u64,
        updated_at_ms: row.get::<_, i64>(5)? as u64,
    })
}
