use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub Uuid);

impl CourseId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CourseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionId(pub Uuid);

impl MissionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(pub Uuid);

impl QuizId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuizId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub Uuid);

impl QuestionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(pub Uuid);

impl AssignmentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssignmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadgeId(pub Uuid);

impl BadgeId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BadgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForumId(pub Uuid);

impl ForumId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ForumId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ForumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub Uuid);

impl PostId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Lecturer,
    Admin,
}

impl UserRole {
    #[must_use]
    pub fn can_author_courses(self) -> bool {
        matches!(self, Self::Lecturer | Self::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    Lecture,
    Reading,
    Video,
    Simulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl User {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        full_name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let now = now_ms();
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            full_name: full_name.into(),
            role,
            created_at_ms: now,
            updated_at_ms: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub points_required: Option<i64>,
    pub criteria: Option<String>,
    pub created_at_ms: u64,
}

impl Badge {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        icon_url: Option<String>,
        points_required: Option<i64>,
        criteria: Option<String>,
    ) -> Self {
        Self {
            id: BadgeId::new(),
            name: name.into(),
            description,
            icon_url,
            points_required,
            criteria,
            created_at_ms: now_ms(),
        }
    }
}

/// Points a student must accumulate per level.
pub const POINTS_PER_LEVEL: i64 = 200;

/// Level derived from accumulated points: one level per 200 points,
/// starting at level 1.
#[must_use]
pub fn level_for_points(total_points: i64) -> i64 {
    total_points.max(0) / POINTS_PER_LEVEL + 1
}

/// Points at which the next level is reached.
#[must_use]
pub fn next_level_threshold(total_points: i64) -> i64 {
    total_points.max(0) / POINTS_PER_LEVEL * POINTS_PER_LEVEL + POINTS_PER_LEVEL
}

/// One gradable question: its identifier (the key students answer under),
/// the stored correct answer, and the points it is worth.
#[derive(Debug, Clone)]
pub struct AnswerKey {
    pub question_id: String,
    pub correct_answer: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizGrade {
    pub correct_count: usize,
    pub total_questions: usize,
    pub score: i64,
    pub points_earned: i64,
}

/// Grades a set of submitted answers against the answer key.
///
/// An answer matches when it equals the correct answer after trimming
/// whitespace and lowercasing both sides. The score is the percentage of
/// correct answers rounded to the nearest integer; points are the sum of
/// the correct questions' point values. Must not be called with an empty
/// key (a quiz with no questions is rejected before grading).
#[must_use]
pub fn grade_quiz(key: &[AnswerKey], answers: &HashMap<String, String>) -> QuizGrade {
    let mut correct_count = 0usize;
    let mut points_earned = 0i64;

    for question in key {
        let Some(answer) = answers.get(&question.question_id) else {
            continue;
        };
        if answer.trim().to_lowercase() == question.correct_answer.trim().to_lowercase() {
            correct_count += 1;
            points_earned += question.points;
        }
    }

    let total_questions = key.len();
    let score = if total_questions == 0 {
        0
    } else {
        (correct_count as f64 / total_questions as f64 * 100.0).round() as i64
    };

    QuizGrade { correct_count, total_questions, score, points_earned }
}

#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(entries: &[(&str, &str, i64)]) -> Vec<AnswerKey> {
        entries
            .iter()
            .map(|(id, correct, points)| AnswerKey {
                question_id: (*id).to_string(),
                correct_answer: (*correct).to_string(),
                points: *points,
            })
            .collect()
    }

    #[test]
    fn user_id_is_unique() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn level_starts_at_one() {
        assert_eq!(level_for_points(0), 1);
        assert_eq!(level_for_points(199), 1);
    }

    #[test]
    fn level_advances_every_200_points() {
        assert_eq!(level_for_points(200), 2);
        assert_eq!(level_for_points(399), 2);
        assert_eq!(level_for_points(400), 3);
        assert_eq!(level_for_points(1000), 6);
    }

    #[test]
    fn next_threshold_is_the_upcoming_multiple() {
        assert_eq!(next_level_threshold(0), 200);
        assert_eq!(next_level_threshold(370), 400);
        assert_eq!(next_level_threshold(400), 600);
    }

    #[test]
    fn grading_is_case_insensitive_and_trimmed() {
        let key = key(&[("q1", "Paris", 5), ("q2", "true", 3)]);
        let answers = HashMap::from([
            ("q1".to_string(), "  paris ".to_string()),
            ("q2".to_string(), "TRUE".to_string()),
        ]);

        let grade = grade_quiz(&key, &answers);
        assert_eq!(grade.correct_count, 2);
        assert_eq!(grade.score, 100);
        assert_eq!(grade.points_earned, 8);
    }

    #[test]
    fn score_is_rounded_percentage() {
        let key = key(&[("q1", "a", 2), ("q2", "b", 2), ("q3", "c", 2)]);
        let answers = HashMap::from([
            ("q1".to_string(), "a".to_string()),
            ("q2".to_string(), "wrong".to_string()),
            ("q3".to_string(), "c".to_string()),
        ]);

        let grade = grade_quiz(&key, &answers);
        assert_eq!(grade.correct_count, 2);
        // 2/3 of 100, rounded
        assert_eq!(grade.score, 67);
        assert_eq!(grade.points_earned, 4);
    }

    #[test]
    fn unanswered_questions_count_as_wrong() {
        let key = key(&[("q1", "a", 1), ("q2", "b", 1)]);
        let answers = HashMap::from([("q1".to_string(), "a".to_string())]);

        let grade = grade_quiz(&key, &answers);
        assert_eq!(grade.correct_count, 1);
        assert_eq!(grade.score, 50);
        assert_eq!(grade.points_earned, 1);
    }
}
