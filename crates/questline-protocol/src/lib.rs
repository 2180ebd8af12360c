//! Wire types exchanged between the questline server and its clients.
//!
//! Identifiers travel as their string form; timestamps are epoch
//! milliseconds throughout.

use questline_core::{MaterialType, QuestionType, UserRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub timestamp_ms: u64,
}

// ---- users ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
}

/// User projection returned to clients. The stored password hash never
/// leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

// ---- courses ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
    pub description: Option<String>,
    pub lecturer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_id: String,
    pub name: String,
    pub description: Option<String>,
    pub lecturer_id: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

// ---- missions ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMissionRequest {
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub meeting_number: i64,
    pub points_reward: i64,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteMissionRequest {
    pub mission_id: String,
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionRecord {
    pub mission_id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub meeting_number: i64,
    pub points_reward: i64,
    pub is_active: bool,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

// ---- learning materials ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMaterialRequest {
    pub mission_id: String,
    pub title: String,
    pub content: Option<String>,
    pub material_type: MaterialType,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub material_id: String,
    pub mission_id: String,
    pub title: String,
    pub content: Option<String>,
    pub material_type: MaterialType,
    pub file_url: Option<String>,
    pub created_at_ms: u64,
}

// ---- quizzes ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuizRequest {
    pub mission_id: String,
    pub title: String,
    pub description: Option<String>,
    pub points_reward: i64,
    pub time_limit_minutes: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRecord {
    pub quiz_id: String,
    pub mission_id: String,
    pub title: String,
    pub description: Option<String>,
    pub points_reward: i64,
    pub time_limit_minutes: Option<i64>,
    pub is_active: bool,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuizQuestionRequest {
    pub quiz_id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    pub points: Option<i64>,
    pub order_index: i64,
}

/// Student-facing question projection: the correct answer stays on the
/// server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestionRecord {
    pub question_id: String,
    pub quiz_id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub points: i64,
    pub order_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_id: String,
    pub student_id: String,
    /// question_id -> submitted answer
    pub answers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSubmissionRecord {
    pub submission_id: String,
    pub quiz_id: String,
    pub student_id: String,
    pub answers: HashMap<String, String>,
    pub score: i64,
    pub points_earned: i64,
    pub submitted_at_ms: u64,
}

// ---- assignments ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignmentRequest {
    pub mission_id: String,
    pub title: String,
    pub description: Option<String>,
    pub points_reward: i64,
    pub due_date_ms: Option<u64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub assignment_id: String,
    pub mission_id: String,
    pub title: String,
    pub description: Option<String>,
    pub points_reward: i64,
    pub due_date_ms: Option<u64>,
    pub is_active: bool,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAssignmentRequest {
    pub assignment_id: String,
    pub student_id: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSubmissionRecord {
    pub submission_id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub score: Option<i64>,
    pub points_earned: Option<i64>,
    pub feedback: Option<String>,
    pub submitted_at_ms: u64,
    pub graded_at_ms: Option<u64>,
}

// ---- progress & gamification ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressQuery {
    pub student_id: String,
    pub course_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub progress_id: String,
    pub student_id: String,
    pub course_id: String,
    pub total_points: i64,
    pub current_level: i64,
    pub missions_completed: i64,
    pub last_activity_ms: u64,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub student_id: String,
    pub student_name: String,
    pub total_points: i64,
    pub current_level: i64,
    pub missions_completed: i64,
    pub rank: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBadgeRequest {
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub points_required: Option<i64>,
    pub criteria: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeRecord {
    pub badge_id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub points_required: Option<i64>,
    pub criteria: Option<String>,
    pub created_at_ms: u64,
}

/// An earned badge joined with the badge it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentBadgeRecord {
    pub award_id: String,
    pub student_id: String,
    pub badge_id: String,
    pub badge_name: String,
    pub badge_description: Option<String>,
    pub earned_at_ms: u64,
}

// ---- discussion forums ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateForumRequest {
    pub mission_id: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumRecord {
    pub forum_id: String,
    pub mission_id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub forum_id: String,
    pub user_id: String,
    pub content: String,
    pub parent_post_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub post_id: String,
    pub forum_id: String,
    pub user_id: String,
    pub content: String,
    pub parent_post_id: Option<String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}
