mod samples;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use questline_core::{MaterialType, QuestionType, UserRole, next_level_threshold};
use questline_protocol::{
    ApiErrorBody, AssignmentRecord, AssignmentSubmissionRecord, BadgeRecord, CompleteMissionRequest,
    CourseRecord, CreateAssignmentRequest, CreateBadgeRequest, CreateCourseRequest,
    CreateForumRequest, CreateMaterialRequest, CreateMissionRequest, CreatePostRequest,
    CreateQuizQuestionRequest, CreateQuizRequest, CreateUserRequest, ForumRecord, LeaderboardEntry,
    MaterialRecord, MissionRecord, PostRecord, ProgressRecord, QuizQuestionRecord, QuizRecord,
    QuizSubmissionRecord, StudentBadgeRecord, SubmitAssignmentRequest, SubmitQuizRequest,
    UserRecord,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

#[derive(Debug, Parser)]
#[command(name = "questline", about = "Questline client")]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:8900")]
    server: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a user account.
    RegisterUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        /// student, lecturer, or admin
        #[arg(long, default_value = "student")]
        role: String,
    },
    /// List all courses.
    Courses,
    CreateCourse {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        lecturer_id: String,
    },
    /// List a course's missions in meeting order.
    Missions {
        #[arg(long)]
        course_id: String,
    },
    CreateMission {
        #[arg(long)]
        course_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        meeting_number: i64,
        #[arg(long, default_value_t = 0)]
        points_reward: i64,
    },
    /// Complete a mission and collect its point reward.
    CompleteMission {
        #[arg(long)]
        mission_id: String,
        #[arg(long)]
        student_id: String,
    },
    Materials {
        #[arg(long)]
        mission_id: String,
    },
    CreateMaterial {
        #[arg(long)]
        mission_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: Option<String>,
        /// lecture, reading, video, or simulation
        #[arg(long, default_value = "lecture")]
        material_type: String,
        #[arg(long)]
        file_url: Option<String>,
    },
    Quizzes {
        #[arg(long)]
        mission_id: String,
    },
    CreateQuiz {
        #[arg(long)]
        mission_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = 0)]
        points_reward: i64,
        #[arg(long)]
        time_limit_minutes: Option<i64>,
    },
    /// List a quiz's questions (without the answer key).
    Questions {
        #[arg(long)]
        quiz_id: String,
    },
    AddQuestion {
        #[arg(long)]
        quiz_id: String,
        #[arg(long)]
        text: String,
        /// multiple_choice, true_false, or short_answer
        #[arg(long, default_value = "short_answer")]
        question_type: String,
        #[arg(long)]
        option: Vec<String>,
        #[arg(long)]
        correct_answer: String,
        #[arg(long)]
        points: Option<i64>,
        #[arg(long)]
        order_index: i64,
    },
    /// Submit quiz answers as repeated `--answer question_id=text` flags.
    SubmitQuiz {
        #[arg(long)]
        quiz_id: String,
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        answer: Vec<String>,
    },
    Assignments {
        #[arg(long)]
        mission_id: String,
    },
    CreateAssignment {
        #[arg(long)]
        mission_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = 0)]
        points_reward: i64,
        #[arg(long)]
        due_date_ms: Option<u64>,
    },
    SubmitAssignment {
        #[arg(long)]
        assignment_id: String,
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        file_url: Option<String>,
    },
    /// Show a student's progress in a course.
    Progress {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        course_id: String,
    },
    Leaderboard {
        #[arg(long)]
        course_id: String,
        #[arg(long)]
        limit: Option<i64>,
    },
    CreateBadge {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        points_required: Option<i64>,
    },
    Badges {
        #[arg(long)]
        student_id: String,
    },
    CreateForum {
        #[arg(long)]
        mission_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Post to a forum; pass --parent-post-id to reply.
    Post {
        #[arg(long)]
        forum_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        parent_post_id: Option<String>,
    },
    Posts {
        #[arg(long)]
        forum_id: String,
    },
}

struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    fn new(base_url: String) -> Self {
        Self { http: reqwest::Client::new(), base_url }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .with_context(|| format!("GET {path} failed"))?;
        Self::parse(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {path} failed"))?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            match response.json::<ApiErrorBody>().await {
                Ok(body) => bail!("{}: {}", status, body.error),
                Err(_) => bail!("request failed with status {}", status),
            }
        }
        Ok(response.json().await?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    tracing::debug!(server = %cli.server, "using questline server");
    let client = ApiClient::new(cli.server.clone());

    match cli.command {
        Command::RegisterUser { username, email, password, full_name, role } => {
            let request = CreateUserRequest {
                username,
                email,
                password,
                full_name,
                role: parse_role(&role)?,
            };
            let user: UserRecord = client.post("/v1/users", &request).await?;
            print_json(&user)?;
        }
        Command::Courses => {
            let mut courses: Vec<CourseRecord> = client.get("/v1/courses").await?;
            if courses.is_empty() {
                println!("no courses yet; showing sample data");
                courses = samples::sample_courses();
            }
            for course in courses {
                println!("{}  {}", course.course_id, course.name);
                if let Some(description) = course.description {
                    println!("    {description}");
                }
            }
        }
        Command::CreateCourse { name, description, lecturer_id } => {
            let request = CreateCourseRequest { name, description, lecturer_id };
            let course: CourseRecord = client.post("/v1/courses", &request).await?;
            print_json(&course)?;
        }
        Command::Missions { course_id } => {
            let mut missions: Vec<MissionRecord> =
                client.get(&format!("/v1/courses/{course_id}/missions")).await?;
            if missions.is_empty() {
                println!("no missions yet; showing sample data");
                missions = samples::sample_missions();
            }
            for mission in missions {
                let status = if mission.is_active { "active" } else { "inactive" };
                println!(
                    "{}  #{} {} [{} pts, {}]",
                    mission.mission_id, mission.meeting_number, mission.title,
                    mission.points_reward, status
                );
            }
        }
        Command::CreateMission { course_id, title, description, meeting_number, points_reward } => {
            let request = CreateMissionRequest {
                course_id,
                title,
                description,
                meeting_number,
                points_reward,
                is_active: None,
            };
            let mission: MissionRecord = client.post("/v1/missions", &request).await?;
            print_json(&mission)?;
        }
        Command::CompleteMission { mission_id, student_id } => {
            let request = CompleteMissionRequest { mission_id, student_id };
            let progress: ProgressRecord = client.post("/v1/missions/complete", &request).await?;
            println!("mission completed");
            print_progress(&progress);
        }
        Command::Materials { mission_id } => {
            let mut materials: Vec<MaterialRecord> =
                client.get(&format!("/v1/missions/{mission_id}/materials")).await?;
            if materials.is_empty() {
                println!("no materials yet; showing sample data");
                materials = samples::sample_materials();
            }
            for material in materials {
                println!("{}  [{:?}] {}", material.material_id, material.material_type, material.title);
                if let Some(file_url) = material.file_url {
                    println!("    {file_url}");
                }
            }
        }
        Command::CreateMaterial { mission_id, title, content, material_type, file_url } => {
            let request = CreateMaterialRequest {
                mission_id,
                title,
                content,
                material_type: parse_material_type(&material_type)?,
                file_url,
            };
            let material: MaterialRecord = client.post("/v1/materials", &request).await?;
            print_json(&material)?;
        }
        Command::Quizzes { mission_id } => {
            let quizzes: Vec<QuizRecord> =
                client.get(&format!("/v1/missions/{mission_id}/quizzes")).await?;
            if quizzes.is_empty() {
                println!("no quizzes for this mission");
            }
            for quiz in quizzes {
                let limit = quiz
                    .time_limit_minutes
                    .map_or("untimed".to_string(), |minutes| format!("{minutes} min"));
                println!("{}  {} [{} pts, {}]", quiz.quiz_id, quiz.title, quiz.points_reward, limit);
            }
        }
        Command::CreateQuiz { mission_id, title, description, points_reward, time_limit_minutes } => {
            let request = CreateQuizRequest {
                mission_id,
                title,
                description,
                points_reward,
                time_limit_minutes,
                is_active: None,
            };
            let quiz: QuizRecord = client.post("/v1/quizzes", &request).await?;
            print_json(&quiz)?;
        }
        Command::Questions { quiz_id } => {
            let questions: Vec<QuizQuestionRecord> =
                client.get(&format!("/v1/quizzes/{quiz_id}/questions")).await?;
            for question in questions {
                println!("{}  {}", question.question_id, question.question_text);
                if let Some(options) = question.options {
                    for option in options {
                        println!("    - {option}");
                    }
                }
            }
        }
        Command::AddQuestion {
            quiz_id,
            text,
            question_type,
            option,
            correct_answer,
            points,
            order_index,
        } => {
            let request = CreateQuizQuestionRequest {
                quiz_id,
                question_text: text,
                question_type: parse_question_type(&question_type)?,
                options: if option.is_empty() { None } else { Some(option) },
                correct_answer,
                points,
                order_index,
            };
            let question: QuizQuestionRecord =
                client.post("/v1/quizzes/questions", &request).await?;
            print_json(&question)?;
        }
        Command::SubmitQuiz { quiz_id, student_id, answer } => {
            let request = SubmitQuizRequest { quiz_id, student_id, answers: parse_answers(&answer)? };
            let submission: QuizSubmissionRecord = client.post("/v1/quizzes/submit", &request).await?;
            println!(
                "score {}%, {} points earned",
                submission.score, submission.points_earned
            );
        }
        Command::Assignments { mission_id } => {
            let assignments: Vec<AssignmentRecord> =
                client.get(&format!("/v1/missions/{mission_id}/assignments")).await?;
            for assignment in assignments {
                println!(
                    "{}  {} [{} pts]",
                    assignment.assignment_id, assignment.title, assignment.points_reward
                );
            }
        }
        Command::CreateAssignment { mission_id, title, description, points_reward, due_date_ms } => {
            let request = CreateAssignmentRequest {
                mission_id,
                title,
                description,
                points_reward,
                due_date_ms,
                is_active: None,
            };
            let assignment: AssignmentRecord = client.post("/v1/assignments", &request).await?;
            print_json(&assignment)?;
        }
        Command::SubmitAssignment { assignment_id, student_id, content, file_url } => {
            let request = SubmitAssignmentRequest { assignment_id, student_id, content, file_url };
            let submission: AssignmentSubmissionRecord =
                client.post("/v1/assignments/submit", &request).await?;
            println!("submitted at {} (ungraded)", submission.submitted_at_ms);
        }
        Command::Progress { student_id, course_id } => {
            let progress: Option<ProgressRecord> = client
                .get(&format!("/v1/progress?student_id={student_id}&course_id={course_id}"))
                .await?;
            match progress {
                Some(progress) => print_progress(&progress),
                None => println!("no progress recorded for this course yet"),
            }
        }
        Command::Leaderboard { course_id, limit } => {
            let mut path = format!("/v1/courses/{course_id}/leaderboard");
            if let Some(limit) = limit {
                path.push_str(&format!("?limit={limit}"));
            }
            let mut entries: Vec<LeaderboardEntry> = client.get(&path).await?;
            if entries.is_empty() {
                println!("leaderboard is empty; showing sample data");
                entries = samples::sample_leaderboard();
            }
            for entry in entries {
                println!(
                    "{:>3}. {:<24} {:>5} pts  level {}  {} missions",
                    entry.rank,
                    entry.student_name,
                    entry.total_points,
                    entry.current_level,
                    entry.missions_completed
                );
            }
        }
        Command::CreateBadge { name, description, points_required } => {
            let request = CreateBadgeRequest {
                name,
                description,
                icon_url: None,
                points_required,
                criteria: None,
            };
            let badge: BadgeRecord = client.post("/v1/badges", &request).await?;
            print_json(&badge)?;
        }
        Command::Badges { student_id } => {
            let badges: Vec<StudentBadgeRecord> =
                client.get(&format!("/v1/students/{student_id}/badges")).await?;
            if badges.is_empty() {
                println!("no badges earned yet");
            }
            for badge in badges {
                println!("{}  {}", badge.badge_id, badge.badge_name);
                if let Some(description) = badge.badge_description {
                    println!("    {description}");
                }
            }
        }
        Command::CreateForum { mission_id, title, description } => {
            let request = CreateForumRequest { mission_id, title, description };
            let forum: ForumRecord = client.post("/v1/forums", &request).await?;
            print_json(&forum)?;
        }
        Command::Post { forum_id, user_id, content, parent_post_id } => {
            let request = CreatePostRequest { forum_id, user_id, content, parent_post_id };
            let post: PostRecord = client.post("/v1/forums/posts", &request).await?;
            print_json(&post)?;
        }
        Command::Posts { forum_id } => {
            let posts: Vec<PostRecord> =
                client.get(&format!("/v1/forums/{forum_id}/posts")).await?;
            for post in posts {
                let indent = if post.parent_post_id.is_some() { "    " } else { "" };
                println!("{indent}{}  {}", post.post_id, post.content);
            }
        }
    }

    Ok(())
}

fn print_progress(progress: &ProgressRecord) {
    let next = next_level_threshold(progress.total_points);
    println!(
        "level {}  {} pts ({} to next level)  {} missions completed",
        progress.current_level,
        progress.total_points,
        next - progress.total_points,
        progress.missions_completed
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_role(raw: &str) -> Result<UserRole> {
    match raw {
        "student" => Ok(UserRole::Student),
        "lecturer" => Ok(UserRole::Lecturer),
        "admin" => Ok(UserRole::Admin),
        other => bail!("unknown role '{other}' (expected student, lecturer, or admin)"),
    }
}

fn parse_material_type(raw: &str) -> Result<MaterialType> {
    match raw {
        "lecture" => Ok(MaterialType::Lecture),
        "reading" => Ok(MaterialType::Reading),
        "video" => Ok(MaterialType::Video),
        "simulation" => Ok(MaterialType::Simulation),
        other => bail!("unknown material type '{other}'"),
    }
}

fn parse_question_type(raw: &str) -> Result<QuestionType> {
    match raw {
        "multiple_choice" => Ok(QuestionType::MultipleChoice),
        "true_false" => Ok(QuestionType::TrueFalse),
        "short_answer" => Ok(QuestionType::ShortAnswer),
        other => bail!("unknown question type '{other}'"),
    }
}

fn parse_answers(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut answers = HashMap::new();
    for pair in pairs {
        let Some((question_id, answer)) = pair.split_once('=') else {
            bail!("answer '{pair}' must look like question_id=text");
        };
        answers.insert(question_id.to_string(), answer.to_string());
    }
    Ok(answers)
}
