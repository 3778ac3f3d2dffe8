// tests/common/mod.rs
#![allow(dead_code)]

use axum::Router;
use chrono::{DateTime, Utc};
use quizcore::{
    config::Config,
    models::result::QuizResult,
    routes,
    state::AppState,
    utils::jwt::Claims,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::{PgPool, postgres::PgPoolOptions};

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        rust_log: "error".to_string(),
        port: 0,
        max_connections: 2,
    }
}

/// Router over a pool that never connects, for tests that are answered
/// before any query runs (auth, validation, routing).
pub fn lazy_router() -> Router {
    let url = "postgres://postgres@127.0.0.1:1/unused";
    let pool = PgPoolOptions::new()
        .connect_lazy(url)
        .expect("lazy pool from a well-formed url");
    routes::create_router(AppState::new(pool, test_config(url)))
}

pub struct TestApp {
    pub address: String,
    pub pool: PgPool,
}

/// Connects to `DATABASE_URL`, migrates, and serves the app on a random port.
/// Tests that call this are `#[ignore]`d; run them with `cargo test -- --ignored`.
pub async fn spawn_app() -> TestApp {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let app = routes::create_router(AppState::new(pool.clone(), test_config(&database_url)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp { address, pool }
}

/// Signs a token the way the identity service would.
pub fn sign_token(user_id: i64, role: &str, secret: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: Utc::now().timestamp() as usize + 600,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("sign test token")
}

pub fn token_for(user_id: i64, role: &str) -> String {
    sign_token(user_id, role, TEST_SECRET)
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

pub async fn create_user(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(unique("u"))
        .fetch_one(pool)
        .await
        .expect("insert user")
}

/// Creates a quiz whose questions have the given correct options.
/// Returns the quiz id and the question ids in ascending order.
pub async fn create_quiz(pool: &PgPool, category: &str, correct: &[i32]) -> (i64, Vec<i64>) {
    let quiz_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO quizzes (title, category, total_questions, duration) VALUES ($1, $2, $3, 10) RETURNING id",
    )
    .bind(unique("quiz"))
    .bind(category)
    .bind(correct.len() as i32)
    .fetch_one(pool)
    .await
    .expect("insert quiz");

    let mut question_ids = Vec::new();
    for (i, option) in correct.iter().enumerate() {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO questions (quiz_id, question_text, options, correct_option, explanation, difficulty)
            VALUES ($1, $2, $3, $4, 'see notes', 'easy')
            RETURNING id
            "#,
        )
        .bind(quiz_id)
        .bind(format!("Question {}", i + 1))
        .bind(serde_json::json!(["A", "B", "C", "D"]))
        .bind(option)
        .fetch_one(pool)
        .await
        .expect("insert question");
        question_ids.push(id);
    }

    (quiz_id, question_ids)
}

/// Inserts a result directly, bypassing scoring, at a chosen time.
pub async fn insert_result(
    pool: &PgPool,
    user_id: i64,
    quiz_id: i64,
    score: f64,
    created_at: DateTime<Utc>,
) -> QuizResult {
    sqlx::query_as::<_, QuizResult>(
        r#"
        INSERT INTO results (user_id, quiz_id, score, correct_count, wrong_count, answers, created_at)
        VALUES ($1, $2, $3, 0, 0, '{}'::jsonb, $4)
        RETURNING id, user_id, quiz_id, score, correct_count, wrong_count, answers, created_at, gamified_at
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(score)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .expect("insert result")
}
