use axum::Json;
use axum::extract::{Path, State};
use questline_core::now_ms;
use questline_protocol::{CreateMaterialRequest, MaterialRecord};
use rusqlite::params;
use uuid::Uuid;

use crate::db::{material_type_from_db, material_type_to_db};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_material(
    State(state): State<AppState>,
    Json(request): Json<CreateMaterialRequest>,
) -> Result<Json<MaterialRecord>, ApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("title is required"));
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

    let material_id = Uuid::new_v4().to_string();
    let created_at_ms = now_ms();
    db.execute(
        "
        INSERT INTO learning_materials (id, mission_id, title, content, material_type, file_url, created_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
        params![
            material_id,
            request.mission_id,
            title,
            request.content,
            material_type_to_db(request.material_type),
            request.file_url,
            created_at_ms
        ],
    )?;

    Ok(Json(MaterialRecord {
        material_id,
        mission_id: request.mission_id,
        title: title.to_string(),
        content: request.content,
        material_type: request.material_type,
        file_url: request.file_url,
        created_at_ms,
    }))
}

pub async fn list_materials_by_mission(
    State(state): State<AppState>,
    Path(mission_id): Path<String>,
) -> Result<Json<Vec<MaterialRecord>>, ApiError> {
    let db = state.db.lock().await;
    let mut stmt = db.prepare(
        "
        SELECT id, mission_id, title, content, material_type, file_url, created_at_ms
        FROM learning_materials
        WHERE mission_id = ?1
        ORDER BY created_at_ms
        ",
    )?;
    let rows = stmt.query_map(params![mission_id], |row| {
        Ok(MaterialRecord {
            material_id: row.get(0)?,
            mission_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            material_type: material_type_from_db(&row.get::<_, String>(4)?),
            file_url: row.get(5)?,
            created_at_ms: row.get::<_, i64>(6)? as u64,
        })
    })?;
    Ok(Json(rows.filter_map(Result::ok).collect()))
}
