mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn sample_test_body() -> Value {
    json!({
        "title": "Quant Mock 1",
        "section": "quant",
        "difficulty": "medium",
        "duration": 40,
        "totalMarks": 6,
        "questions": [
            {
                "questionText": "2 + 2 = ?",
                "options": ["3", "4", "5", "6"],
                "correctAnswer": "4",
                "explanation": "Basic addition",
                "marks": 3
            },
            {
                "questionText": "5 * 6 = ?",
                "options": ["11", "30", "56"],
                "correctAnswer": "30",
                "marks": 3
            }
        ]
    })
}

#[tokio::test]
async fn create_test_requires_auth() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/tests", server.base_url))
        .json(&sample_test_body())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_detail_never_exposes_correct_answers() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let (_email, token) = common::register_user(server).await?;

    let res = client
        .post(format!("{}/api/tests", server.base_url))
        .bearer_auth(&token)
        .json(&sample_test_body())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let test_id = created["id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/api/tests/{}", server.base_url, test_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;

    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    for q in questions {
        assert!(q.get("correctAnswer").is_none(), "answer leaked: {q}");
        assert!(q.get("correct_answer").is_none());
        assert!(q["questionText"].is_string());
        assert!(q["options"].is_array());
    }
    Ok(())
}

#[tokio::test]
async fn test_listing_includes_question_counts() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();
    let (_email, token) = common::register_user(server).await?;

    let res = client
        .post(format!("{}/api/tests", server.base_url))
        .bearer_auth(&token)
        .json(&sample_test_body())
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;

    let res = client
        .get(format!("{}/api/tests", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let listed = body
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == created["id"])
        .expect("created test missing from listing");
    assert_eq!(listed["questionCount"], 2);
    Ok(())
}

#[tokio::test]
async fn unknown_test_is_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::db_available(server).await {
        return Ok(());
    }
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/api/tests/00000000-0000-4000-8000-000000000000",
            server.base_url
        ))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
