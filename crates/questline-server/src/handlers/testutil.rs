//! Seed helpers for handler tests: an in-memory database plus fixtures
//! created through the real handlers.

use axum::Json;
use axum::extract::State;
use questline_core::{QuestionType, UserRole};
use questline_protocol::{
    CreateAssignmentRequest, CreateCourseRequest, CreateForumRequest, CreateMissionRequest,
    CreateQuizQuestionRequest, CreateQuizRequest, CreateUserRequest,
};
use rusqlite::Connection;

use crate::db::apply_schema;
use crate::handlers::{assignments, courses, forums, missions, quizzes, users};
use crate::state::AppState;

pub(crate) fn state() -> AppState {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    apply_schema(&conn).expect("apply schema");
    AppState::new(conn)
}

pub(crate) async fn seed_user(state: &AppState, username: &str, full_name: &str, role: UserRole) -> String {
    users::create_user(
        State(state.clone()),
        Json(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password: "secret123".to_string(),
            full_name: full_name.to_string(),
            role,
        }),
    )
    .await
    .expect("seed user")
    .0
    .user_id
}

pub(crate) async fn seed_lecturer(state: &AppState) -> String {
    seed_user(state, "lecturer1", "Test Lecturer", UserRole::Lecturer).await
}

pub(crate) async fn seed_admin(state: &AppState) -> String {
    seed_user(state, "admin1", "Test Admin", UserRole::Admin).await
}

pub(crate) async fn seed_student(state: &AppState) -> String {
    seed_user(state, "student1", "Test Student", UserRole::Student).await
}

pub(crate) async fn seed_named_student(state: &AppState, username: &str, full_name: &str) -> String {
    seed_user(state, username, full_name, UserRole::Student).await
}

pub(crate) async fn seed_course(state: &AppState, lecturer_id: &str, name: &str) -> String {
    courses::create_course(
        State(state.clone()),
        Json(CreateCourseRequest {
            name: name.to_string(),
            description: Some("seeded course".to_string()),
            lecturer_id: lecturer_id.to_string(),
        }),
    )
    .await
    .expect("seed course")
    .0
    .course_id
}

pub(crate) async fn seed_mission(
    state: &AppState,
    course_id: &str,
    meeting_number: i64,
    points_reward: i64,
) -> String {
    missions::create_mission(
        State(state.clone()),
        Json(CreateMissionRequest {
            course_id: course_id.to_string(),
            title: format!("Meeting {meeting_number}"),
            description: None,
            meeting_number,
            points_reward,
            is_active: None,
        }),
    )
    .await
    .expect("seed mission")
    .0
    .mission_id
}

pub(crate) async fn seed_inactive_mission(state: &AppState, course_id: &str) -> String {
    missions::create_mission(
        State(state.clone()),
        Json(CreateMissionRequest {
            course_id: course_id.to_string(),
            title: "Archived meeting".to_string(),
            description: None,
            meeting_number: 99,
            points_reward: 100,
            is_active: Some(false),
        }),
    )
    .await
    .expect("seed inactive mission")
    .0
    .mission_id
}

pub(crate) async fn seed_quiz(state: &AppState, mission_id: &str) -> String {
    quizzes::create_quiz(
        State(state.clone()),
        Json(CreateQuizRequest {
            mission_id: mission_id.to_string(),
            title: "Seeded quiz".to_string(),
            description: None,
            points_reward: 50,
            time_limit_minutes: Some(30),
            is_active: None,
        }),
    )
    .await
    .expect("seed quiz")
    .0
    .quiz_id
}

pub(crate) async fn seed_inactive_quiz(state: &AppState, mission_id: &str) -> String {
    quizzes::create_quiz(
        State(state.clone()),
        Json(CreateQuizRequest {
            mission_id: mission_id.to_string(),
            title: "Closed quiz".to_string(),
            description: None,
            points_reward: 50,
            time_limit_minutes: None,
            is_active: Some(false),
        }),
    )
    .await
    .expect("seed inactive quiz")
    .0
    .quiz_id
}

pub(crate) async fn seed_question(
    state: &AppState,
    quiz_id: &str,
    text: &str,
    correct_answer: &str,
    points: i64,
    order_index: i64,
) -> String {
    quizzes::create_quiz_question(
        State(state.clone()),
        Json(CreateQuizQuestionRequest {
            quiz_id: quiz_id.to_string(),
            question_text: text.to_string(),
            question_type: QuestionType::ShortAnswer,
            options: None,
            correct_answer: correct_answer.to_string(),
            points: Some(points),
            order_index,
        }),
    )
    .await
    .expect("seed question")
    .0
    .question_id
}

pub(crate) async fn seed_assignment(state: &AppState, mission_id: &str) -> String {
    assignments::create_assignment(
        State(state.clone()),
        Json(CreateAssignmentRequest {
            mission_id: mission_id.to_string(),
            title: "Seeded assignment".to_string(),
            description: None,
            points_reward: 100,
            due_date_ms: None,
            is_active: None,
        }),
    )
    .await
    .expect("seed assignment")
    .0
    .assignment_id
}

pub(crate) async fn seed_forum(state: &AppState, mission_id: &str, title: &str) -> String {
    forums::create_forum(
        State(state.clone()),
        Json(CreateForumRequest {
            mission_id: mission_id.to_string(),
            title: title.to_string(),
            description: None,
        }),
    )
    .await
    .expect("seed forum")
    .0
    .forum_id
}
