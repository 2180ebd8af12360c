mod config;
mod db;
mod error;
mod handlers;
mod state;

use anyhow::Result;
use axum::{
    Json, Router,
    routing::{get, post},
};
use clap::{Parser, Subcommand};
use config::ServerConfig;
use questline_core::now_ms;
use questline_protocol::HealthStatus;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "questline-server", about = "Questline course-management service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Serve {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        db_path: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Serve { port, db_path, config } => {
            let mut server_config = ServerConfig::load(config.as_deref());
            if let Some(port) = port {
                server_config.port = port;
            }
            if let Some(db_path) = db_path {
                server_config.db_path = db_path;
            }
            serve(server_config).await?;
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> Result<()> {
    let connection = db::init_db(&config.db_path)?;
    let state = AppState::new(connection);

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("questline server listening on http://{}", addr);
    info!("sqlite database at {}", config.db_path.display());
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/users", post(handlers::users::create_user))
        .route(
            "/v1/courses",
            get(handlers::courses::list_courses).post(handlers::courses::create_course),
        )
        .route("/v1/courses/{course_id}/missions", get(handlers::missions::list_missions_by_course))
        .route("/v1/courses/{course_id}/leaderboard", get(handlers::progress::get_leaderboard))
        .route("/v1/missions", post(handlers::missions::create_mission))
        .route("/v1/missions/complete", post(handlers::missions::complete_mission))
        .route(
            "/v1/missions/{mission_id}/materials",
            get(handlers::materials::list_materials_by_mission),
        )
        .route("/v1/missions/{mission_id}/quizzes", get(handlers::quizzes::list_quizzes_by_mission))
        .route(
            "/v1/missions/{mission_id}/assignments",
            get(handlers::assignments::list_assignments_by_mission),
        )
        .route("/v1/materials", post(handlers::materials::create_material))
        .route("/v1/quizzes", post(handlers::quizzes::create_quiz))
        .route("/v1/quizzes/questions", post(handlers::quizzes::create_quiz_question))
        .route("/v1/quizzes/submit", post(handlers::quizzes::submit_quiz))
        .route("/v1/quizzes/{quiz_id}/questions", get(handlers::quizzes::list_quiz_questions))
        .route("/v1/assignments", post(handlers::assignments::create_assignment))
        .route("/v1/assignments/submit", post(handlers::assignments::submit_assignment))
        .route("/v1/progress", get(handlers::progress::get_progress))
        .route("/v1/badges", post(handlers::badges::create_badge))
        .route("/v1/students/{student_id}/badges", get(handlers::badges::get_student_badges))
        .route("/v1/forums", post(handlers::forums::create_forum))
        .route("/v1/forums/posts", post(handlers::forums::create_post))
        .route("/v1/forums/{forum_id}/posts", get(handlers::forums::list_posts_by_forum))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus { ok: true, timestamp_ms: now_ms() })
}
