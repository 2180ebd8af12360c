use axum::Json;
use axum::extract::{Path, State};
use questline_core::{ForumId, PostId, now_ms};
use questline_protocol::{CreateForumRequest, CreatePostRequest, ForumRecord, PostRecord};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_forum(
    State(state): State<AppState>,
    Json(request): Json<CreateForumRequest>,
) -> Result<Json<ForumRecord>, ApiError> {
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

    let forum_id = ForumId::new().to_string();
    let created_at_ms = now_ms();
    db.execute(
        "INSERT INTO discussion_forums (id, mission_id, title, description, created_at_ms)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![forum_id, request.mission_id, title, request.description, created_at_ms],
    )?;

    Ok(Json(ForumRecord {
        forum_id,
        mission_id: request.mission_id,
        title: title.to_string(),
        description: request.description,
        created_at_ms,
    }))
}

/// Creates a top-level post or a reply. Replies carry the parent post's
/// identifier; the parent must live in the same forum.
pub async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<Json<PostRecord>, ApiError> {
    if request.content.trim().is_empty() {
        return Err(ApiError::bad_request("content is required"));
    }

    let db = state.db.lock().await;

    let forum_exists: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM discussion_forums WHERE id = ?1)",
        params![request.forum_id],
        |row| row.get(0),
    )?;
    if forum_exists == 0 {
        return Err(ApiError::not_found("forum not found"));
    }

    let user_exists: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        params![request.user_id],
        |row| row.get(0),
    )?;
    if user_exists == 0 {
        return Err(ApiError::not_found("user not found"));
    }

    if let Some(parent_post_id) = &request.parent_post_id {
        let parent_forum: Option<String> = db
            .query_row(
                "SELECT forum_id FROM discussion_posts WHERE id = ?1",
                params![parent_post_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(parent_forum) = parent_forum else {
            return Err(ApiError::not_found("parent post not found"));
        };
        if parent_forum != request.forum_id {
            return Err(ApiError::bad_request("parent post must belong to the same forum"));
        }
    }

    let post_id = PostId::new().to_string();
    let now = now_ms();
    db.execute(
        "
        INSERT INTO discussion_posts (id, forum_id, user_id, content, parent_post_id, created_at_ms, updated_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        ",
        params![post_id, request.forum_id, request.user_id, request.content, request.parent_post_id, now],
    )?;

    let post = fetch_post(&db, &post_id)?
        .ok_or_else(|| ApiError::internal("failed to reload post after creation"))?;
    Ok(Json(post))
}

pub async fn list_posts_by_forum(
    State(state): State<AppState>,
    Path(forum_id): Path<String>,
) -> Result<Json<Vec<PostRecord>>, ApiError> {
    let db = state.db.lock().await;
    let mut stmt = db.prepare(
        "
        SELECT id, forum_id, user_id, content, parent_post_id, created_at_ms, updated_at_ms
        FROM discussion_posts
        WHERE forum_id = ?1
        ORDER BY created_at_ms
        ",
    )?;
    let rows = stmt.query_map(params![forum_id], map_post_row)?;
    Ok(Json(rows.filter_map(Result::ok).collect()))
}

fn fetch_post(conn: &Connection, post_id: &str) -> Result<Option<PostRecord>, ApiError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, forum_id, user_id, content, parent_post_id, created_at_ms, updated_at_ms
        FROM discussion_posts WHERE id = ?1
        ",
    )?;

    let mut rows = stmt.query(params![post_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(map_post_row(row)?));
    }
    Ok(None)
}

fn map_post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        post_id: row.get(0)?,
        forum_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        parent_post_id: row.get(4)?,
        created_at_ms: row.get::<_, i64>(5)? as u64,
        updated_at_ms: row.get::<_, i64>(6)? as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn replies_must_stay_in_the_parent_forum() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 100).await;
        let forum_a = testutil::seed_forum(&state, &mission_id, "Forum A").await;
        let forum_b = testutil::seed_forum(&state, &mission_id, "Forum B").await;
        let student_id = testutil::seed_student(&state).await;

        let parent = create_post(
            State(state.clone()),
            Json(CreatePostRequest {
                forum_id: forum_a.clone(),
                user_id: student_id.clone(),
                content: "First!".to_string(),
                parent_post_id: None,
            }),
        )
        .await
        .expect("parent post")
        .0;

        let err = create_post(
            State(state.clone()),
            Json(CreatePostRequest {
                forum_id: forum_b,
                user_id: student_id,
                content: "Cross-forum reply".to_string(),
                parent_post_id: Some(parent.post_id),
            }),
        )
        .await
        .expect_err("cross-forum reply");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "parent post must belong to the same forum");
    }

    #[tokio::test]
    async fn replies_to_missing_parents_are_rejected() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 100).await;
        let forum_id = testutil::seed_forum(&state, &mission_id, "Forum").await;
        let student_id = testutil::seed_student(&state).await;

        let err = create_post(
            State(state.clone()),
            Json(CreatePostRequest {
                forum_id,
                user_id: student_id,
                content: "reply".to_string(),
                parent_post_id: Some("missing".to_string()),
            }),
        )
        .await
        .expect_err("missing parent");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn posts_list_oldest_first_with_parent_links() {
        let state = testutil::state();
        let lecturer_id = testutil::seed_lecturer(&state).await;
        let course_id = testutil::seed_course(&state, &lecturer_id, "Course").await;
        let mission_id = testutil::seed_mission(&state, &course_id, 1, 100).await;
        let forum_id = testutil::seed_forum(&state, &mission_id, "Forum").await;
        let student_id = testutil::seed_student(&state).await;

        let parent = create_post(
            State(state.clone()),
            Json(CreatePostRequest {
                forum_id: forum_id.clone(),
                user_id: student_id.clone(),
                content: "Question".to_string(),
                parent_post_id: None,
            }),
        )
        .await
        .expect("parent")
        .0;
        let reply = create_post(
            State(state.clone()),
            Json(CreatePostRequest {
                forum_id: forum_id.clone(),
                user_id: student_id.clone(),
                content: "Answer".to_string(),
                parent_post_id: Some(parent.post_id.clone()),
            }),
        )
        .await
        .expect("reply")
        .0;

        // force distinct timestamps so the ordering is deterministic
        {
            let db = state.db.lock().await;
            db.execute(
                "UPDATE discussion_posts SET created_at_ms = created_at_ms + 10 WHERE id = ?1",
                params![reply.post_id],
            )
            .expect("adjust timestamp");
        }

        let posts =
            list_posts_by_forum(State(state.clone()), Path(forum_id)).await.expect("list").0;
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].content, "Question");
        assert_eq!(posts[1].parent_post_id.as_deref(), Some(posts[0].post_id.as_str()));
    }
}
