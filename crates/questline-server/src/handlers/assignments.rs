use axum::Json;
use axum::extract::{Path, State};
use questline_core::{AssignmentId, now_ms};
use questline_protocol::{
    AssignmentRecord, AssignmentSubmissionRecord, CreateAssignmentRequest, SubmitAssignmentRequest,
};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_assignment(
    State(state): State<AppState>,
    Json(request): Json<CreateAssignmentRequest>,
) -> Result<Json<AssignmentRecord>, ApiError> {
    let title = request.title.trim();
    if title.is_empty() || title.len() > 200 {
        return Err(ApiError::bad_request("title must be between 1 and 200 characters"));
    }
    if request.points_reward < 0 {
        return Err(ApiError::bad_request("points_reward must not be negative"));
    }

    let db = state.db.lock().await;

    let mission_exists: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM missions WHERE id = ?1)",
        params![request.mission_id],
        |row| row.get(0),
    )?;
    if mission_exists == 0 {
        return Err(ApiError::not_found("mission_id not found"));
    }

    let assignment_id = AssignmentId::new().to_string();
    db.execute(
        "
        INSERT INTO assignments (
          id, mission_id, title, description, points_reward, due_date_ms,
          is_active, created_at_ms
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ",
        params![
            assignment_id,
            request.mission_id,
            title,
            request.description,
            request.points_reward,
            request.due_date_ms,
            request.is_active.unwrap_or(true),
            now_ms()
        ],
    )?;

    let assignment = fetch_assignment(&db, &assignment_id)?
        .ok_or_else(|| ApiError::internal("failed to reload assignment after creation"))?;
    Ok(Json(assignment))
}

pub async fn list_assignments_by_mission(
    State(state): State<AppState>,
    Path(mission_id): Path<String>,
) -> Result<Json<Vec<AssignmentRecord>>, ApiError> {
    let db = state.db.lock().await;
    let mut stmt = db.prepare(
        "
        SELECT id, mission_id, title, description, points_reward, due_date_ms,
               is_active, created_at_ms
        FROM assignments
        WHERE mission_id = ?1
        ORDER BY created_at_ms
        ",
    )?;
    let rows = stmt.query_map(params![mission_id], map_assignment_row)?;
    Ok(Json(rows.filter_map(Result::ok).collect()))
}

/// Accepts a student's work product for an assignment. The submission is
/// stored ungraded; one submission per student per assignment.
pub async fn submit_assignment(
    State(state): State<AppState>,
    Json(request): Json<SubmitAssignmentRequest>,
) -> Result<Json<AssignmentSubmissionRecord>, ApiError> {
    let content = normalized(&request.content);
    let file_url = normalized(&request.file_url);
    if content.is_none() && file_url.is_none() {
        return Err(ApiError::bad_request("either content or file_url must be provided"));
    }

    let db = state.db.lock().await;

    let is_active: Option<bool> = db
        .query_row(
            "SELECT is_active FROM assignments WHERE id = ?1",
            params![request.assignment_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(is_active) = is_active else {
        return Err(ApiError::not_found("assignment_id not found"));
    };
    if !is_active {
        return Err(ApiError::bad_request("assignment is not active"));
    }

    let student_exists: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1 AND role = 'student')",
        params![request.student_id],
        |row| row.get(0),
    )?;
    if student_exists == 0 {
        return Err(ApiError::not_found("student not found"));
    }

    let already_submitted: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM assignment_submissions WHERE assignment_id = ?1 AND student_id = ?2)",
        params![request.assignment_id, request.student_id],
        |row| row.get(0),
    )?;
    if already_submitted != 0 {
        return Err(ApiError::conflict("assignment already submitted"));
    }

    let submission_id = Uuid::new_v4().to_string();
    let submitted_at_ms = now_ms();
    db.execute(
        "
        INSERT INTO assignment_submissions (
          id, assignment_id, student_id, content, file_url, score, points_earned,
          feedback, submitted_at_ms, graded_at_ms
        ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, NULL, NULL, ?6, NULL)
        ",
        params![
            submission_id,
            request.assignment_id,
            request.student_id,
            content,
            file_url,
            submitted_at_ms
        ],
    )?;

    Ok(Json(AssignmentSubmissionRecord {
        submission_id,
        assignment_id: request.assignment_id,
        student_id: request.student_id,
        content: content.map(str::to_string),
        file_url: file_url.map(str::to_string),
        score: None,
        points_earned: None,
        feedback: None,
        submitted_at_ms,
        graded_at_ms: None,
    }))
}

fn normalized(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn fetch_assignment(
    conn: &Connection,
    assignment_id: &str,
) -> Result<Option<AssignmentRecord>, ApiError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, mission_id, title, description, points_reward, due_date_ms,
               is_active, created_at_ms
        FROM assignments WHERE id = ?1
        ",
    )?;

    let mut rows = stmt.query(params![assignment_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(map_assignment_row(row)?));
    }
    Ok(None)
}

fn map_assignment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssignmentRecord> {
    Ok(AssignmentRecord {
        assignment_id: row.get(0)?,
        mission_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        points_reward: row.get(4)?,
        due_date_ms: row.get::<_, Option<i64>>(5)?.map(|value| value as u64),
        is_active: row.get(6)?,
        created_at_ms: row.get::<_, i64>(7)? as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn submission_starts_ungraded() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 100).await;
        let assignment_id = testutil::seed_assignment(&state, &mission_id).await;
        let student_id = testutil::seed_student(&state).await;

        let submission = submit_assignment(
            State(state.clone()),
            Json(SubmitAssignmentRequest {
                assignment_id,
                student_id,
                content: Some("My essay".to_string()),
                file_url: None,
            }),
        )
        .await
        .expect("submit")
        .0;

        assert_eq!(submission.content.as_deref(), Some("My essay"));
        assert!(submission.score.is_none());
        assert!(submission.graded_at_ms.is_none());
    }

    #[tokio::test]
    async fn second_submission_is_rejected() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 100).await;
        let assignment_id = testutil::seed_assignment(&state, &mission_id).await;
        let student_id = testutil::seed_student(&state).await;

        let request = SubmitAssignmentRequest {
            assignment_id,
            student_id,
            content: Some("My essay".to_string()),
            file_url: None,
        };
        submit_assignment(State(state.clone()), Json(request.clone())).await.expect("first");
        let err = submit_assignment(State(state.clone()), Json(request))
            .await
            .expect_err("second submission");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn another_student_can_still_submit() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 100).await;
        let assignment_id = testutil::seed_assignment(&state, &mission_id).await;
        let first = testutil::seed_named_student(&state, "first", "First Student").await;
        let second = testutil::seed_named_student(&state, "second", "Second Student").await;

        submit_assignment(
            State(state.clone()),
            Json(SubmitAssignmentRequest {
                assignment_id: assignment_id.clone(),
                student_id: first,
                content: Some("essay".to_string()),
                file_url: None,
            }),
        )
        .await
        .expect("first student");

        let result = submit_assignment(
            State(state.clone()),
            Json(SubmitAssignmentRequest {
                assignment_id,
                student_id: second,
                content: Some("essay".to_string()),
                file_url: None,
            }),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn empty_submissions_are_rejected() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 100).await;
        let assignment_id = testutil::seed_assignment(&state, &mission_id).await;
        let student_id = testutil::seed_student(&state).await;

        let err = submit_assignment(
            State(state.clone()),
            Json(SubmitAssignmentRequest {
                assignment_id,
                student_id,
                content: Some("   ".to_string()),
                file_url: None,
            }),
        )
        .await
        .expect_err("blank submission");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
