use axum::Json;
use axum::extract::{Path, State};
use questline_core::{Badge, now_ms};
use questline_protocol::{BadgeRecord, CreateBadgeRequest, StudentBadgeRecord};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_badge(
    State(state): State<AppState>,
    Json(request): Json<CreateBadgeRequest>,
) -> Result<Json<BadgeRecord>, ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if matches!(request.points_required, Some(points) if points < 0) {
        return Err(ApiError::bad_request("points_required must not be negative"));
    }

    let badge = Badge::new(
        name,
        request.description,
        request.icon_url,
        request.points_required,
        request.criteria,
    );

    let db = state.db.lock().await;
    db.execute(
        "
        INSERT INTO badges (id, name, description, icon_url, points_required, criteria, created_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
        params![
            badge.id.to_string(),
            badge.name,
            badge.description,
            badge.icon_url,
            badge.points_required,
            badge.criteria,
            badge.created_at_ms
        ],
    )?;

    Ok(Json(BadgeRecord {
        badge_id: badge.id.to_string(),
        name: badge.name,
        description: badge.description,
        icon_url: badge.icon_url,
        points_required: badge.points_required,
        criteria: badge.criteria,
        created_at_ms: badge.created_at_ms,
    }))
}

pub async fn get_student_badges(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<StudentBadgeRecord>>, ApiError> {
    let db = state.db.lock().await;
    let mut stmt = db.prepare(
        "
        SELECT sb.id, sb.student_id, sb.badge_id, b.name, b.description, sb.earned_at_ms
        FROM student_badges sb
        JOIN badges b ON b.id = sb.badge_id
        WHERE sb.student_id = ?1
        ORDER BY sb.earned_at_ms
        ",
    )?;
    let rows = stmt.query_map(params![student_id], |row| {
        Ok(StudentBadgeRecord {
            award_id: row.get(0)?,
            student_id: row.get(1)?,
            badge_id: row.get(2)?,
            badge_name: row.get(3)?,
            badge_description: row.get(4)?,
            earned_at_ms: row.get::<_, i64>(5)? as u64,
        })
    })?;
    Ok(Json(rows.filter_map(Result::ok).collect()))
}

/// Grants every badge whose points threshold the student now meets.
/// Already-earned badges are left untouched.
pub(crate) fn award_earned_badges(
    conn: &Connection,
    student_id: &str,
    total_points: i64,
) -> Result<(), ApiError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM badges WHERE points_required IS NOT NULL AND points_required <= ?1",
    )?;
    let badge_ids: Vec<String> =
        stmt.query_map(params![total_points], |row| row.get(0))?.filter_map(Result::ok).collect();

    let now = now_ms();
    for badge_id in badge_ids {
        conn.execute(
            "
            INSERT INTO student_badges (id, student_id, badge_id, earned_at_ms)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(student_id, badge_id) DO NOTHING
            ",
            params![Uuid::new_v4().to_string(), student_id, badge_id, now],
        )?;
    }
    Ok(())
}
