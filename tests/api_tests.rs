// tests/api_tests.rs
//
// End-to-end flows over HTTP. Need a Postgres database in DATABASE_URL.

mod common;

use chrono::{Duration, Utc};
use serde_json::{Value, json};

async fn submit(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/results/submit", address))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
}

async fn recalculate(client: &reqwest::Client, address: &str, token: &str) -> Value {
    client
        .post(format!("{}/api/analytics/user/recalculate", address))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap()
}

async fn stored_rank(pool: &sqlx::PgPool, user_id: i64) -> i32 {
    sqlx::query_scalar::<_, Option<i32>>("SELECT rank FROM user_analytics WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
        .expect("ranked after a rank pass")
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn submission_scores_two_question_quiz() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();
    let user_id = common::create_user(&app.pool).await;
    let token = common::token_for(user_id, "user");
    let (quiz_id, q) = common::create_quiz(&app.pool, "GK", &[0, 1]).await;

    let cases = [
        (json!({ q[0].to_string(): 0, q[1].to_string(): 1 }), 100.0, 2, 0),
        // Numeric strings are accepted for option indexes.
        (json!({ q[0].to_string(): "1", q[1].to_string(): 1 }), 50.0, 1, 1),
        (json!({}), 0.0, 0, 2),
    ];

    for (answers, score, correct, wrong) in cases {
        let response = submit(&client, &app.address, &token, json!({"quiz_id": quiz_id, "answers": answers})).await;
        assert_eq!(response.status().as_u16(), 201);

        let result: Value = response.json().await.unwrap();
        assert_eq!(result["score"].as_f64().unwrap(), score);
        assert_eq!(result["correct_count"], correct);
        assert_eq!(result["wrong_count"], wrong);
        assert!(result["id"].as_i64().is_some());
        assert!(result["created_at"].is_string());
    }

    let history: Vec<Value> = client
        .get(format!("{}/api/results", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["score"].as_f64().unwrap(), 0.0);
    assert_eq!(history[0]["quiz_category"], "GK");
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn unknown_quiz_is_404_and_writes_nothing() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();
    let user_id = common::create_user(&app.pool).await;
    let token = common::token_for(user_id, "user");

    let response = submit(&client, &app.address, &token, json!({"quiz_id": i64::MAX, "answers": {}})).await;
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let stored = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM results WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn perfect_first_submission_grants_rewards() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();
    let user_id = common::create_user(&app.pool).await;
    let token = common::token_for(user_id, "user");
    let (quiz_id, q) = common::create_quiz(&app.pool, "IT", &[2, 3]).await;

    let answers = json!({ q[0].to_string(): 2, q[1].to_string(): 3 });
    for _ in 0..2 {
        let response = submit(&client, &app.address, &token, json!({"quiz_id": quiz_id, "answers": answers})).await;
        assert_eq!(response.status().as_u16(), 201);
    }

    let achievements: Vec<Value> = client
        .get(format!("{}/api/achievements", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mut kinds: Vec<&str> = achievements
        .iter()
        .map(|a| a["achievement_type"].as_str().unwrap())
        .collect();
    kinds.sort();
    assert_eq!(kinds, vec!["first_quiz", "perfect_score"]);

    let badges: Vec<Value> = client
        .get(format!("{}/api/badges", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0]["type"], "score_90");

    let streak: Value = client
        .get(format!("{}/api/streak", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(streak["current_streak"], 1);
    assert_eq!(streak["longest_streak"], 1);

    let catalog: Vec<Value> = client
        .get(format!("{}/api/achievements/catalog", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog.len(), 9);
    let earned: Vec<&str> = catalog
        .iter()
        .filter(|c| c["earned"] == true)
        .map(|c| c["achievement_type"].as_str().unwrap())
        .collect();
    assert_eq!(earned, vec!["first_quiz", "perfect_score"]);
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn result_details_show_each_question() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();
    let user_id = common::create_user(&app.pool).await;
    let token = common::token_for(user_id, "user");
    let (quiz_id, q) = common::create_quiz(&app.pool, "English", &[0, 1, 2]).await;

    let answers = json!({ q[0].to_string(): 0, q[1].to_string(): "3" });
    let result: Value = submit(&client, &app.address, &token, json!({"quiz_id": quiz_id, "answers": answers}))
        .await
        .json()
        .await
        .unwrap();
    let result_id = result["id"].as_i64().unwrap();

    let detail: Value = client
        .get(format!("{}/api/results/{}/details", app.address, result_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(detail["quiz"]["id"], quiz_id);
    assert_eq!(detail["quiz"]["category"], "English");
    let questions = detail["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0]["is_correct"], true);
    assert_eq!(questions[1]["user_answer"], 3);
    assert_eq!(questions[1]["is_correct"], false);
    assert_eq!(questions[1]["correct_option"], 1);
    assert!(questions[2]["user_answer"].is_null());
    assert_eq!(questions[2]["explanation"], "see notes");
    assert_eq!(questions[2]["difficulty"], "easy");

    // Someone else's result is invisible.
    let stranger = common::token_for(common::create_user(&app.pool).await, "user");
    let response = client
        .get(format!("{}/api/results/{}/details", app.address, result_id))
        .bearer_auth(&stranger)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn analytics_recalculate_is_idempotent() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();
    let user_id = common::create_user(&app.pool).await;
    let token = common::token_for(user_id, "user");
    let (gk_quiz, _) = common::create_quiz(&app.pool, "GK", &[0]).await;
    let (it_quiz, _) = common::create_quiz(&app.pool, "IT", &[0]).await;

    let now = Utc::now();
    common::insert_result(&app.pool, user_id, gk_quiz, 40.0, now).await;
    common::insert_result(&app.pool, user_id, gk_quiz, 20.0, now).await;
    common::insert_result(&app.pool, user_id, it_quiz, 90.0, now).await;

    let first = recalculate(&client, &app.address, &token).await;
    assert_eq!(first["total_quizzes"], 3);
    assert_eq!(first["average_score"].as_f64().unwrap(), 50.0);
    assert_eq!(first["category_stats"]["GK"]["count"], 2);
    assert_eq!(first["category_stats"]["GK"]["best_score"].as_f64().unwrap(), 40.0);
    assert_eq!(first["best_category"], "IT");
    assert_eq!(first["worst_category"], "GK");
    assert!(first["rank"].as_i64().unwrap() >= 1);

    let second = recalculate(&client, &app.address, &token).await;
    for field in ["total_quizzes", "average_score", "category_stats", "best_category", "worst_category"] {
        assert_eq!(first[field], second[field], "{} changed between recomputes", field);
    }
    assert!(second["version"].as_i64() > first["version"].as_i64());

    let summary: Value = client
        .get(format!("{}/api/analytics", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["total_quizzes"], 3);
    assert_eq!(summary["weak_topics"][0]["category"], "GK");
    assert_eq!(summary["recent_scores"].as_array().unwrap().len(), 3);
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn higher_average_ranks_ahead() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();
    let strong = common::create_user(&app.pool).await;
    let weak = common::create_user(&app.pool).await;
    let (quiz_id, _) = common::create_quiz(&app.pool, "Nepali", &[0]).await;

    common::insert_result(&app.pool, strong, quiz_id, 95.0, Utc::now()).await;
    common::insert_result(&app.pool, weak, quiz_id, 15.0, Utc::now()).await;

    let mut ranks = Vec::new();
    for user in [weak, strong] {
        let snapshot = recalculate(&client, &app.address, &common::token_for(user, "user")).await;
        ranks.push(snapshot["rank"].as_i64().unwrap());
    }
    assert!(ranks.iter().all(|rank| *rank >= 1));

    let admin = common::token_for(strong, "admin");
    let pass: Value = client
        .post(format!("{}/api/admin/analytics/rerank", app.address))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(pass["epoch"].as_i64().unwrap() >= 1);

    assert!(stored_rank(&app.pool, strong).await < stored_rank(&app.pool, weak).await);
}

#[tokio::test]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn leaderboard_filters_by_category_and_period() {
    let app = common::spawn_app().await;
    let client = reqwest::Client::new();
    let category = common::unique("c");
    let (quiz_id, _) = common::create_quiz(&app.pool, &category, &[0]).await;
    let (other_quiz, _) = common::create_quiz(&app.pool, "GK", &[0]).await;

    let alice = common::create_user(&app.pool).await;
    let bob = common::create_user(&app.pool).await;
    let now = Utc::now();

    common::insert_result(&app.pool, alice, quiz_id, 60.0, now).await;
    common::insert_result(&app.pool, alice, quiz_id, 80.0, now - Duration::days(2)).await;
    // Too old for the weekly window.
    common::insert_result(&app.pool, bob, quiz_id, 100.0, now - Duration::days(10)).await;
    common::insert_result(&app.pool, bob, quiz_id, 90.0, now).await;
    // Wrong category.
    common::insert_result(&app.pool, bob, other_quiz, 100.0, now).await;

    let board: Vec<Value> = client
        .get(format!(
            "{}/api/leaderboard?category={}&period=weekly",
            app.address, category
        ))
        .bearer_auth(common::token_for(bob, "user"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["total_score"].as_f64().unwrap(), 140.0);
    assert_eq!(board[0]["quizzes_taken"], 2);
    assert_eq!(board[0]["average_score"].as_f64().unwrap(), 70.0);
    assert_eq!(board[0]["is_current_user"], false);
    assert_eq!(board[1]["total_score"].as_f64().unwrap(), 90.0);
    assert_eq!(board[1]["is_current_user"], true);

    // All time, anonymous: bob's old result counts again.
    let all_time: Vec<Value> = client
        .get(format!("{}/api/leaderboard?category={}", app.address, category))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all_time[0]["total_score"].as_f64().unwrap(), 190.0);
    assert!(all_time.iter().all(|e| e["is_current_user"] == false));
}
