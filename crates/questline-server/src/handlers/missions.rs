use axum::Json;
use axum::extract::{Path, State};
use questline_core::{MissionId, now_ms};
use questline_protocol::{CompleteMissionRequest, CreateMissionRequest, MissionRecord, ProgressRecord};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::progress::apply_points;
use crate::state::AppState;

pub async fn create_mission(
    State(state): State<AppState>,
    Json(request): Json<CreateMissionRequest>,
) -> Result<Json<MissionRecord>, ApiError> {
    let title = request.title.trim();
    if title.is_empty() || title.len() > 200 {
        return Err(ApiError::bad_request("title must be between 1 and 200 characters"));
    }
    if request.meeting_number < 1 {
        return Err(ApiError::bad_request("meeting_number must be positive"));
    }
    if request.points_reward < 0 {
        return Err(ApiError::bad_request("points_reward must not be negative"));
    }

    let db = state.db.lock().await;

    let course_exists: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM courses WHERE id = ?1)",
        params![request.course_id],
        |row| row.get(0),
    )?;
    if course_exists == 0 {
        return Err(ApiError::not_found("course_id not found"));
    }

    let mission_id = MissionId::new().to_string();
    let now = now_ms();
    db.execute(
        "
        INSERT INTO missions (
          id, course_id, title, description, meeting_number, points_reward,
          is_active, created_at_ms, updated_at_ms
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        ",
        params![
            mission_id,
            request.course_id,
            title,
            request.description,
            request.meeting_number,
            request.points_reward,
            request.is_active.unwrap_or(true),
            now
        ],
    )?;

    let mission = fetch_mission(&db, &mission_id)?
        .ok_or_else(|| ApiError::internal("failed to reload mission after creation"))?;
    Ok(Json(mission))
}

pub async fn list_missions_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<MissionRecord>>, ApiError> {
    let db = state.db.lock().await;
    let mut stmt = db.prepare(
        "
        SELECT id, course_id, title, description, meeting_number, points_reward,
               is_active, created_at_ms, updated_at_ms
        FROM missions
        WHERE course_id = ?1
        ORDER BY meeting_number
        ",
    )?;
    let rows = stmt.query_map(params![course_id], map_mission_row)?;
    Ok(Json(rows.filter_map(Result::ok).collect()))
}

/// Records a mission completion for a student: awards the mission's point
/// reward to the per-course progress, bumps the completed-mission count,
/// and returns the updated progress.
pub async fn complete_mission(
    State(state): State<AppState>,
    Json(request): Json<CompleteMissionRequest>,
) -> Result<Json<ProgressRecord>, ApiError> {
    let db = state.db.lock().await;

    let mission: Option<(String, i64, bool)> = db
        .query_row(
            "SELECT course_id, points_reward, is_active FROM missions WHERE id = ?1",
            params![request.mission_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;
    let Some((course_id, points_reward, is_active)) = mission else {
        return Err(ApiError::not_found("mission_id not found"));
    };
    if !is_active {
        return Err(ApiError::bad_request("mission is not active"));
    }

    let student_exists: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1 AND role = 'student')",
        params![request.student_id],
        |row| row.get(0),
    )?;
    if student_exists == 0 {
        return Err(ApiError::not_found("student not found"));
    }

    let already_completed: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM mission_completions WHERE mission_id = ?1 AND student_id = ?2)",
        params![request.mission_id, request.student_id],
        |row| row.get(0),
    )?;
    if already_completed != 0 {
        return Err(ApiError::conflict("mission already completed"));
    }

    db.execute(
        "INSERT INTO mission_completions (id, mission_id, student_id, completed_at_ms)
         VALUES (?1, ?2, ?3, ?4)",
        params![Uuid::new_v4().to_string(), request.mission_id, request.student_id, now_ms()],
    )?;

    let progress = apply_points(&db, &request.student_id, &course_id, points_reward, 1)?;
    Ok(Json(progress))
}

fn fetch_mission(conn: &Connection, mission_id: &str) -> Result<Option<MissionRecord>, ApiError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, course_id, title, description, meeting_number, points_reward,
               is_active, created_at_ms, updated_at_ms
        FROM missions WHERE id = ?1
        ",
    )?;

    let mut rows = stmt.query(params![mission_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(map_mission_row(row)?));
    }
    Ok(None)
}

fn map_mission_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MissionRecord> {
    Ok(MissionRecord {
        mission_id: row.get(0)?,
        course_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        meeting_number: row.get(4)?,
        points_reward: row.get(5)?,
        is_active: row.get(6)?,
        created_at_ms: row.get::<_, i64>(7)? as u64,
        updated_at_ms: row.get::<_, i64>(8)? as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn missions_require_an_existing_course() {
        let state = testutil::state();

        let err = create_mission(
            State(state.clone()),
            Json(CreateMissionRequest {
                course_id: "missing".to_string(),
                title: "Meeting 1".to_string(),
                description: None,
                meeting_number: 1,
                points_reward: 100,
                is_active: None,
            }),
        )
        .await
        .expect_err("missing course");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missions_list_in_meeting_order() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;

        for meeting_number in [3i64, 1, 2] {
            create_mission(
                State(state.clone()),
                Json(CreateMissionRequest {
                    course_id: course_id.clone(),
                    title: format!("Meeting {meeting_number}"),
                    description: None,
                    meeting_number,
                    points_reward: 50,
                    is_active: None,
                }),
            )
            .await
            .expect("create mission");
        }

        let missions =
            list_missions_by_course(State(state.clone()), Path(course_id)).await.expect("list").0;
        let order: Vec<_> = missions.iter().map(|mission| mission.meeting_number).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn completing_a_mission_awards_points_and_counts_it() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 250).await;
        let student_id = testutil::seed_student(&state).await;

        let progress = complete_mission(
            State(state.clone()),
            Json(CompleteMissionRequest {
                mission_id: mission_id.clone(),
                student_id: student_id.clone(),
            }),
        )
        .await
        .expect("complete")
        .0;

        assert_eq!(progress.total_points, 250);
        assert_eq!(progress.current_level, 2);
        assert_eq!(progress.missions_completed, 1);
    }

    #[tokio::test]
    async fn completing_a_mission_twice_is_rejected() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 100).await;
        let student_id = testutil::seed_student(&state).await;

        let request = CompleteMissionRequest {
            mission_id: mission_id.clone(),
            student_id: student_id.clone(),
        };
        complete_mission(State(state.clone()), Json(request.clone())).await.expect("first");
        let err = complete_mission(State(state.clone()), Json(request))
            .await
            .expect_err("second completion");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn inactive_missions_cannot_be_completed() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_inactive_mission(&state, &course_id).await;
        let student_id = testutil::seed_student(&state).await;

        let err = complete_mission(
            State(state.clone()),
            Json(CompleteMissionRequest { mission_id, student_id }),
        )
        .await
        .expect_err("inactive mission");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn only_students_can_complete_missions() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 100).await;

        let err = complete_mission(
            State(state.clone()),
            Json(CompleteMissionRequest { mission_id, student_id: lecturer_id }),
        )
        .await
        .expect_err("lecturer completing");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
