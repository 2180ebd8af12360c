use anyhow::Result;
use questline_core::{MaterialType, QuestionType, UserRole};
use rusqlite::Connection;
use std::fs;
use std::path::Path;

pub fn init_db(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;
    apply_schema(&conn)?;
    Ok(conn)
}

pub fn apply_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
          id TEXT PRIMARY KEY,
          username TEXT NOT NULL UNIQUE,
          email TEXT NOT NULL UNIQUE,
          password_hash TEXT NOT NULL,
          full_name TEXT NOT NULL,
          role TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS courses (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          description TEXT,
          lecturer_id TEXT NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          FOREIGN KEY(lecturer_id) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS missions (
          id TEXT PRIMARY KEY,
          course_id TEXT NOT NULL,
          title TEXT NOT NULL,
          description TEXT,
          meeting_number INTEGER NOT NULL,
          points_reward INTEGER NOT NULL DEFAULT 0,
          is_active INTEGER NOT NULL DEFAULT 1,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          FOREIGN KEY(course_id) REFERENCES courses(id)
        );

        CREATE TABLE IF NOT EXISTS learning_materials (
          id TEXT PRIMARY KEY,
          mission_id TEXT NOT NULL,
          title TEXT NOT NULL,
          content TEXT,
          material_type TEXT NOT NULL,
          file_url TEXT,
          created_at_ms INTEGER NOT NULL,
          FOREIGN KEY(mission_id) REFERENCES missions(id)
        );

        CREATE TABLE IF NOT EXISTS quizzes (
          id TEXT PRIMARY KEY,
          mission_id TEXT NOT NULL,
          title TEXT NOT NULL,
          description TEXT,
          points_reward INTEGER NOT NULL DEFAULT 0,
          time_limit_minutes INTEGER,
          is_active INTEGER NOT NULL DEFAULT 1,
          created_at_ms INTEGER NOT NULL,
          FOREIGN KEY(mission_id) REFERENCES missions(id)
        );

        CREATE TABLE IF NOT EXISTS quiz_questions (
          id TEXT PRIMARY KEY,
          quiz_id TEXT NOT NULL,
          question_text TEXT NOT NULL,
          question_type TEXT NOT NULL,
          options TEXT,
          correct_answer TEXT NOT NULL,
          points INTEGER NOT NULL DEFAULT 1,
          order_index INTEGER NOT NULL,
          FOREIGN KEY(quiz_id) REFERENCES quizzes(id)
        );

        CREATE TABLE IF NOT EXISTS assignments (
          id TEXT PRIMARY KEY,
          mission_id TEXT NOT NULL,
          title TEXT NOT NULL,
          description TEXT,
          points_reward INTEGER NOT NULL DEFAULT 0,
          due_date_ms INTEGER,
          is_active INTEGER NOT NULL DEFAULT 1,
          created_at_ms INTEGER NOT NULL,
          FOREIGN KEY(mission_id) REFERENCES missions(id)
        );

        CREATE TABLE IF NOT EXISTS student_progress (
          id TEXT PRIMARY KEY,
          student_id TEXT NOT NULL,
          course_id TEXT NOT NULL,
          total_points INTEGER NOT NULL DEFAULT 0,
          current_level INTEGER NOT NULL DEFAULT 1,
          missions_completed INTEGER NOT NULL DEFAULT 0,
          last_activity_ms INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          UNIQUE(student_id, course_id),
          FOREIGN KEY(student_id) REFERENCES users(id),
          FOREIGN KEY(course_id) REFERENCES courses(id)
        );

        CREATE TABLE IF NOT EXISTS mission_completions (
          id TEXT PRIMARY KEY,
          mission_id TEXT NOT NULL,
          student_id TEXT NOT NULL,
          completed_at_ms INTEGER NOT NULL,
          UNIQUE(mission_id, student_id),
          FOREIGN KEY(mission_id) REFERENCES missions(id),
          FOREIGN KEY(student_id) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS badges (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          description TEXT,
          icon_url TEXT,
          points_required INTEGER,
          criteria TEXT,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS student_badges (
          id TEXT PRIMARY KEY,
          student_id TEXT NOT NULL,
          badge_id TEXT NOT NULL,
          earned_at_ms INTEGER NOT NULL,
          UNIQUE(student_id, badge_id),
          FOREIGN KEY(student_id) REFERENCES users(id),
          FOREIGN KEY(badge_id) REFERENCES badges(id)
        );

        CREATE TABLE IF NOT EXISTS quiz_submissions (
          id TEXT PRIMARY KEY,
          quiz_id TEXT NOT NULL,
          student_id TEXT NOT NULL,
          answers TEXT NOT NULL,
          score INTEGER NOT NULL,
          points_earned INTEGER NOT NULL,
          submitted_at_ms INTEGER NOT NULL,
          FOREIGN KEY(quiz_id) REFERENCES quizzes(id),
          FOREIGN KEY(student_id) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS assignment_submissions (
          id TEXT PRIMARY KEY,
          assignment_id TEXT NOT NULL,
          student_id TEXT NOT NULL,
          content TEXT,
          file_url TEXT,
          score INTEGER,
          points_earned INTEGER,
          feedback TEXT,
          submitted_at_ms INTEGER NOT NULL,
          graded_at_ms INTEGER,
          FOREIGN KEY(assignment_id) REFERENCES assignments(id),
          FOREIGN KEY(student_id) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS discussion_forums (
          id TEXT PRIMARY KEY,
          mission_id TEXT NOT NULL,
          title TEXT NOT NULL,
          description TEXT,
          created_at_ms INTEGER NOT NULL,
          FOREIGN KEY(mission_id) REFERENCES missions(id)
        );

        CREATE TABLE IF NOT EXISTS discussion_posts (
          id TEXT PRIMARY KEY,
          forum_id TEXT NOT NULL,
          user_id TEXT NOT NULL,
          content TEXT NOT NULL,
          parent_post_id TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          FOREIGN KEY(forum_id) REFERENCES discussion_forums(id),
          FOREIGN KEY(user_id) REFERENCES users(id)
        );
        ",
    )
}

pub fn role_to_db(role: UserRole) -> &'static str {
    match role {
        UserRole::Student => "student",
        UserRole::Lecturer => "lecturer",
        UserRole::Admin => "admin",
    }
}

pub fn role_from_db(raw: &str) -> UserRole {
    match raw {
        "lecturer" => UserRole::Lecturer,
        "admin" => UserRole::Admin,
        _ => UserRole::Student,
    }
}

pub fn material_type_to_db(material_type: MaterialType) -> &'static str {
    match material_type {
        MaterialType::Lecture => "lecture",
        MaterialType::Reading => "reading",
        MaterialType::Video => "video",
        MaterialType::Simulation => "simulation",
    }
}

pub fn material_type_from_db(raw: &str) -> MaterialType {
    match raw {
        "reading" => MaterialType::Reading,
        "video" => MaterialType::Video,
        "simulation" => MaterialType::Simulation,
        _ => MaterialType::Lecture,
    }
}

pub fn question_type_to_db(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::MultipleChoice => "multiple_choice",
        QuestionType::TrueFalse => "true_false",
        QuestionType::ShortAnswer => "short_answer",
    }
}

pub fn question_type_from_db(raw: &str) -> QuestionType {
    match raw {
        "true_false" => QuestionType::TrueFalse,
        "short_answer" => QuestionType::ShortAnswer,
        _ => QuestionType::MultipleChoice,
    }
}
