//! Built-in sample data rendered when the backend has no rows yet, so a
//! fresh install still shows what the views look like.

use questline_core::MaterialType;
use questline_protocol::{CourseRecord, LeaderboardEntry, MaterialRecord, MissionRecord};

pub fn sample_courses() -> Vec<CourseRecord> {
    vec![CourseRecord {
        course_id: "sample-course-1".to_string(),
        name: "Total Quality Management (TQM)".to_string(),
        description: Some(
            "Practical module covering TQM principles, implementation, and continuous improvement methodologies"
                .to_string(),
        ),
        lecturer_id: "sample-lecturer-1".to_string(),
        created_at_ms: 0,
        updated_at_ms: 0,
    }]
}

pub fn sample_missions() -> Vec<MissionRecord> {
    let mission = |number: i64, title: &str, description: &str, points: i64, active: bool| {
        MissionRecord {
            mission_id: format!("sample-mission-{number}"),
            course_id: "sample-course-1".to_string(),
            title: title.to_string(),
            description: Some(description.to_string()),
            meeting_number: number,
            points_reward: points,
            is_active: active,
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    };

    vec![
        mission(
            1,
            "Pertemuan 1: Introduction to TQM",
            "Understanding the fundamentals of Total Quality Management and its principles",
            100,
            true,
        ),
        mission(
            2,
            "Pertemuan 2: Quality Planning & Control",
            "Learn about quality planning processes and control mechanisms",
            120,
            true,
        ),
        mission(
            3,
            "Pertemuan 3: Continuous Improvement",
            "Implementing continuous improvement strategies in TQM",
            150,
            true,
        ),
        mission(
            4,
            "Pertemuan 4: Statistical Quality Control",
            "Using statistical methods for quality control and process improvement",
            140,
            false,
        ),
    ]
}

pub fn sample_leaderboard() -> Vec<LeaderboardEntry> {
    let entry = |rank: i64, name: &str, points: i64, level: i64, missions: i64| LeaderboardEntry {
        student_id: format!("sample-student-{rank}"),
        student_name: name.to_string(),
        total_points: points,
        current_level: level,
        missions_completed: missions,
        rank,
    };

    vec![
        entry(1, "Siti Nurhaliza", 520, 4, 3),
        entry(2, "Budi Santoso", 450, 3, 3),
        entry(3, "Ahmad Pratama", 370, 3, 2),
        entry(4, "Maya Sari", 320, 2, 2),
        entry(5, "Rizki Pratama", 280, 2, 2),
    ]
}

pub fn sample_materials() -> Vec<MaterialRecord> {
    vec![
        MaterialRecord {
            material_id: "sample-material-1".to_string(),
            mission_id: "sample-mission-1".to_string(),
            title: "TQM Fundamentals Lecture".to_string(),
            content: Some("Core concepts and principles of Total Quality Management".to_string()),
            material_type: MaterialType::Lecture,
            file_url: None,
            created_at_ms: 0,
        },
        MaterialRecord {
            material_id: "sample-material-2".to_string(),
            mission_id: "sample-mission-1".to_string(),
            title: "TQM Introduction Video".to_string(),
            content: Some("Interactive video covering TQM basics".to_string()),
            material_type: MaterialType::Video,
            file_url: Some("/materials/tqm-intro.mp4".to_string()),
            created_at_ms: 0,
        },
        MaterialRecord {
            material_id: "sample-material-3".to_string(),
            mission_id: "sample-mission-1".to_string(),
            title: "Quality Management Simulation".to_string(),
            content: Some("Interactive simulation for understanding quality processes".to_string()),
            material_type: MaterialType::Simulation,
            file_url: Some("/simulations/quality-mgmt".to_string()),
            created_at_ms: 0,
        },
    ]
}
