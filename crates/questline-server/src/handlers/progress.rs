use axum::Json;
use axum::extract::{Path, Query, State};
use questline_core::{level_for_points, now_ms};
use questline_protocol::{LeaderboardEntry, LeaderboardQuery, ProgressQuery, ProgressRecord};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::badges::award_earned_badges;
use crate::state::AppState;

const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<Option<ProgressRecord>>, ApiError> {
    let db = state.db.lock().await;
    Ok(Json(fetch_progress(&db, &query.student_id, &query.course_id)?))
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT).max(0);

    let db = state.db.lock().await;
    let mut stmt = db.prepare(
        "
        SELECT p.student_id, u.full_name, p.total_points, p.current_level, p.missions_completed
        FROM student_progress p
        JOIN users u ON u.id = p.student_id
        WHERE p.course_id = ?1
        ORDER BY p.total_points DESC, p.missions_completed DESC
        LIMIT ?2
        ",
    )?;
    let rows = stmt.query_map(params![course_id, limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, i64>(4)?,
        ))
    })?;

    let entries = rows
        .filter_map(Result::ok)
        .enumerate()
        .map(|(index, (student_id, student_name, total_points, current_level, missions_completed))| {
            LeaderboardEntry {
                student_id,
                student_name,
                total_points,
                current_level,
                missions_completed,
                rank: index as i64 + 1,
            }
        })
        .collect();
    Ok(Json(entries))
}

/// Adds earned points (and optionally a completed mission) to the student's
/// per-course progress, creating the row on first award. Recomputes the
/// level from the new total and grants any badges whose threshold is met.
pub(crate) fn apply_points(
    conn: &Connection,
    student_id: &str,
    course_id: &str,
    points_delta: i64,
    missions_delta: i64,
) -> Result<ProgressRecord, ApiError> {
    let now = now_ms();
    let existing: Option<(String, i64, i64)> = conn
        .query_row(
            "SELECT id, total_points, missions_completed FROM student_progress
             WHERE student_id = ?1 AND course_id = ?2",
            params![student_id, course_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let new_total = match existing {
        Some((progress_id, total_points, missions_completed)) => {
            let new_total = total_points + points_delta;
            conn.execute(
                "
                UPDATE student_progress
                SET total_points = ?2,
                    current_level = ?3,
                    missions_completed = ?4,
                    last_activity_ms = ?5,
                    updated_at_ms = ?5
                WHERE id = ?1
                ",
                params![
                    progress_id,
                    new_total,
                    level_for_points(new_total),
                    missions_completed + missions_delta,
                    now
                ],
            )?;
            new_total
        }
        None => {
            conn.execute(
                "
                INSERT INTO student_progress (
                  id, student_id, course_id, total_points, current_level,
                  missions_completed, last_activity_ms, created_at_ms, updated_at_ms
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?7)
                ",
                params![
                    Uuid::new_v4().to_string(),
                    student_id,
                    course_id,
                    points_delta,
                    level_for_points(points_delta),
                    missions_delta,
                    now
                ],
            )?;
            points_delta
        }
    };

    award_earned_badges(conn, student_id, new_total)?;

    fetch_progress(conn, student_id, course_id)?
        .ok_or_else(|| ApiError::internal("failed to reload progress after update"))
}

pub(crate) fn fetch_progress(
    conn: &Connection,
    student_id: &str,
    course_id: &str,
) -> Result<Option<ProgressRecord>, ApiError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, student_id, course_id, total_points, current_level,
               missions_completed, last_activity_ms, created_at_ms, updated_at_ms
        FROM student_progress
        WHERE student_id = ?1 AND course_id = ?2
        ",
    )?;

    let mut rows = stmt.query(params![student_id, course_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(ProgressRecord {
            progress_id: row.get(0)?,
            student_id: row.get(1)?,
            course_id: row.get(2)?,
            total_points: row.get(3)?,
            current_level: row.get(4)?,
            missions_completed: row.get(5)?,
            last_activity_ms: row.get::<_, i64>(6)? as u64,
            created_at_ms: row.get::<_, i64>(7)? as u64,
            updated_at_ms: row.get::<_, i64>(8)? as u64,
        }));
    }
    Ok(None)
}
