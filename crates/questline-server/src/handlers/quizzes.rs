use axum::Json;
use axum::extract::{Path, State};
use questline_core::{AnswerKey, QuestionId, QuestionType, QuizId, grade_quiz, now_ms};
use questline_protocol::{
    CreateQuizQuestionRequest, CreateQuizRequest, QuizQuestionRecord, QuizRecord,
    QuizSubmissionRecord, SubmitQuizRequest,
};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::db::{question_type_from_db, question_type_to_db};
use crate::error::ApiError;
use crate::handlers::progress::apply_points;
use crate::state::AppState;

pub async fn create_quiz(
    State(state): State<AppState>,
    Json(request): Json<CreateQuizRequest>,
) -> Result<Json<QuizRecord>, ApiError> {
    let title = request.title.trim();
    if title.is_empty() || title.len() > 200 {
        return Err(ApiError::bad_request("title must be between 1 and 200 characters"));
    }
    if request.points_reward < 0 {
        return Err(ApiError::bad_request("points_reward must not be negative"));
    }
    if matches!(request.time_limit_minutes, Some(limit) if limit < 1) {
        return Err(ApiError::bad_request("time_limit_minutes must be positive"));
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

    let quiz_id = QuizId::new().to_string();
    db.execute(
        "
        INSERT INTO quizzes (
          id, mission_id, title, description, points_reward, time_limit_minutes,
          is_active, created_at_ms
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ",
        params![
            quiz_id,
            request.mission_id,
            title,
            request.description,
            request.points_reward,
            request.time_limit_minutes,
            request.is_active.unwrap_or(true),
            now_ms()
        ],
    )?;

    let quiz = fetch_quiz(&db, &quiz_id)?
        .ok_or_else(|| ApiError::internal("failed to reload quiz after creation"))?;
    Ok(Json(quiz))
}

pub async fn list_quizzes_by_mission(
    State(state): State<AppState>,
    Path(mission_id): Path<String>,
) -> Result<Json<Vec<QuizRecord>>, ApiError> {
    let db = state.db.lock().await;
    let mut stmt = db.prepare(
        "
        SELECT id, mission_id, title, description, points_reward, time_limit_minutes,
               is_active, created_at_ms
        FROM quizzes
        WHERE mission_id = ?1
        ORDER BY created_at_ms
        ",
    )?;
    let rows = stmt.query_map(params![mission_id], map_quiz_row)?;
    Ok(Json(rows.filter_map(Result::ok).collect()))
}

pub async fn create_quiz_question(
    State(state): State<AppState>,
    Json(request): Json<CreateQuizQuestionRequest>,
) -> Result<Json<QuizQuestionRecord>, ApiError> {
    let question_text = request.question_text.trim();
    if question_text.is_empty() {
        return Err(ApiError::bad_request("question_text is required"));
    }
    if request.correct_answer.trim().is_empty() {
        return Err(ApiError::bad_request("correct_answer is required"));
    }
    let points = request.points.unwrap_or(1);
    if points < 0 {
        return Err(ApiError::bad_request("points must not be negative"));
    }
    if request.question_type == QuestionType::MultipleChoice
        && request.options.as_ref().is_none_or(|options| options.len() < 2)
    {
        return Err(ApiError::bad_request("multiple choice questions need at least two options"));
    }

    let db = state.db.lock().await;

    let quiz_exists: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM quizzes WHERE id = ?1)",
        params![request.quiz_id],
        |row| row.get(0),
    )?;
    if quiz_exists == 0 {
        return Err(ApiError::not_found("quiz_id not found"));
    }

    let options_json = match &request.options {
        Some(options) => Some(
            serde_json::to_string(options)
                .map_err(|_| ApiError::internal("failed to encode options"))?,
        ),
        None => None,
    };

    let question_id = QuestionId::new().to_string();
    db.execute(
        "
        INSERT INTO quiz_questions (
          id, quiz_id, question_text, question_type, options, correct_answer, points, order_index
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ",
        params![
            question_id,
            request.quiz_id,
            question_text,
            question_type_to_db(request.question_type),
            options_json,
            request.correct_answer,
            points,
            request.order_index
        ],
    )?;

    let question = fetch_question(&db, &question_id)?
        .ok_or_else(|| ApiError::internal("failed to reload question after creation"))?;
    Ok(Json(question))
}

pub async fn list_quiz_questions(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<Json<Vec<QuizQuestionRecord>>, ApiError> {
    let db = state.db.lock().await;
    let mut stmt = db.prepare(
        "
        SELECT id, quiz_id, question_text, question_type, options, points, order_index
        FROM quiz_questions
        WHERE quiz_id = ?1
        ORDER BY order_index
        ",
    )?;
    let rows = stmt.query_map(params![quiz_id], map_question_row)?;
    Ok(Json(rows.filter_map(Result::ok).collect()))
}

/// Grades a quiz submission against the stored answer key, records it, and
/// credits the earned points to the student's progress in the quiz's course.
pub async fn submit_quiz(
    State(state): State<AppState>,
    Json(request): Json<SubmitQuizRequest>,
) -> Result<Json<QuizSubmissionRecord>, ApiError> {
    let db = state.db.lock().await;

    let quiz: Option<(String, bool)> = db
        .query_row(
            "SELECT mission_id, is_active FROM quizzes WHERE id = ?1",
            params![request.quiz_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let Some((mission_id, is_active)) = quiz else {
        return Err(ApiError::not_found("quiz_id not found"));
    };
    if !is_active {
        return Err(ApiError::bad_request("quiz is not active"));
    }

    let student_exists: i64 = db.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1 AND role = 'student')",
        params![request.student_id],
        |row| row.get(0),
    )?;
    if student_exists == 0 {
        return Err(ApiError::not_found("student not found"));
    }

    let mut stmt = db.prepare(
        "SELECT id, correct_answer, points FROM quiz_questions WHERE quiz_id = ?1 ORDER BY order_index",
    )?;
    let key: Vec<AnswerKey> = stmt
        .query_map(params![request.quiz_id], |row| {
            Ok(AnswerKey {
                question_id: row.get(0)?,
                correct_answer: row.get(1)?,
                points: row.get(2)?,
            })
        })?
        .filter_map(Result::ok)
        .collect();
    drop(stmt);
    if key.is_empty() {
        return Err(ApiError::bad_request("quiz has no questions"));
    }

    let grade = grade_quiz(&key, &request.answers);
    let answers_json = serde_json::to_string(&request.answers)
        .map_err(|_| ApiError::internal("failed to encode answers"))?;

    let submission_id = Uuid::new_v4().to_string();
    let submitted_at_ms = now_ms();
    db.execute(
        "
        INSERT INTO quiz_submissions (id, quiz_id, student_id, answers, score, points_earned, submitted_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
        params![
            submission_id,
            request.quiz_id,
            request.student_id,
            answers_json,
            grade.score,
            grade.points_earned,
            submitted_at_ms
        ],
    )?;

    let course_id: String = db.query_row(
        "SELECT course_id FROM missions WHERE id = ?1",
        params![mission_id],
        |row| row.get(0),
    )?;
    apply_points(&db, &request.student_id, &course_id, grade.points_earned, 0)?;

    Ok(Json(QuizSubmissionRecord {
        submission_id,
        quiz_id: request.quiz_id,
        student_id: request.student_id,
        answers: request.answers,
        score: grade.score,
        points_earned: grade.points_earned,
        submitted_at_ms,
    }))
}

fn fetch_quiz(conn: &Connection, quiz_id: &str) -> Result<Option<QuizRecord>, ApiError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, mission_id, title, description, points_reward, time_limit_minutes,
               is_active, created_at_ms
        FROM quizzes WHERE id = ?1
        ",
    )?;

    let mut rows = stmt.query(params![quiz_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(map_quiz_row(row)?));
    }
    Ok(None)
}

fn fetch_question(
    conn: &Connection,
    question_id: &str,
) -> Result<Option<QuizQuestionRecord>, ApiError> {
    let mut stmt = conn.prepare(
        "
        SELECT id, quiz_id, question_text, question_type, options, points, order_index
        FROM quiz_questions WHERE id = ?1
        ",
    )?;

    let mut rows = stmt.query(params![question_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(map_question_row(row)?));
    }
    Ok(None)
}

fn map_quiz_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuizRecord> {
    Ok(QuizRecord {
        quiz_id: row.get(0)?,
        mission_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        points_reward: row.get(4)?,
        time_limit_minutes: row.get(5)?,
        is_active: row.get(6)?,
        created_at_ms: row.get::<_, i64>(7)? as u64,
    })
}

fn map_question_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuizQuestionRecord> {
    let options_json: Option<String> = row.get(4)?;
    Ok(QuizQuestionRecord {
        question_id: row.get(0)?,
        quiz_id: row.get(1)?,
        question_text: row.get(2)?,
        question_type: question_type_from_db(&row.get::<_, String>(3)?),
        options: options_json.and_then(|raw| serde_json::from_str(&raw).ok()),
        points: row.get(5)?,
        order_index: row.get(6)?,
    })
}
