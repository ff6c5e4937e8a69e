mod common;

use anyhow::Result;
use reqwest::multipart;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_module(client: &reqwest::Client, base_url: &str) -> Result<i64> {
    let res = client
        .post(format!("{}/courses", base_url))
        .json(&json!({ "title": "Lesson host course" }))
        .send()
        .await?;
    let course_id = res.json::<Value>().await?["data"]["id"].as_i64().unwrap();

    let res = client
        .post(format!("{}/courses/{}/modules", base_url, course_id))
        .json(&json!({ "title": "Lesson host module" }))
        .send()
        .await?;
    Ok(res.json::<Value>().await?["data"]["id"].as_i64().unwrap())
}

#[tokio::test]
async fn text_lesson_round_trips_content() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let module_id = create_module(&client, &server.base_url).await?;

    let form = multipart::Form::new()
        .text("title", "Borrow checker basics")
        .text("type", "TEXT")
        .text("content", "References must not outlive their referents.");
    let res = client
        .post(format!("{}/lessons/modules/{}", server.base_url, module_id))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let lesson_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["type"], "TEXT");

    // Content comes back as the literal stored string, unchanged
    let res = client
        .get(format!("{}/lessons/{}/content", server.base_url, lesson_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "References must not outlive their referents.");

    Ok(())
}

#[tokio::test]
async fn text_lesson_requires_content() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let module_id = create_module(&client, &server.base_url).await?;

    let form = multipart::Form::new()
        .text("title", "Empty lesson")
        .text("type", "TEXT")
        .text("content", "   ");
    let res = client
        .post(format!("{}/lessons/modules/{}", server.base_url, module_id))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Text content is required for TEXT type lessons");

    Ok(())
}

#[tokio::test]
async fn file_lesson_requires_upload() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let module_id = create_module(&client, &server.base_url).await?;

    let form = multipart::Form::new()
        .text("title", "Intro video")
        .text("type", "VIDEO");
    let res = client
        .post(format!("{}/lessons/modules/{}", server.base_url, module_id))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "File is required for VIDEO type lessons");

    Ok(())
}

#[tokio::test]
async fn file_lesson_serves_bytes_with_fixed_label() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let module_id = create_module(&client, &server.base_url).await?;

    let payload = b"%PDF-1.4 fake course handout".to_vec();
    let part = multipart::Part::bytes(payload.clone()).file_name("handout.pdf");
    let form = multipart::Form::new()
        .text("title", "Course handout")
        .text("type", "PDF")
        .part("file", part);
    let res = client
        .post(format!("{}/lessons/modules/{}", server.base_url, module_id))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let lesson_id = body["data"]["id"].as_i64().unwrap();
    let stored_name = body["data"]["content"].as_str().unwrap().to_string();
    assert!(stored_name.ends_with("_handout.pdf"));

    let res = client
        .get(format!("{}/lessons/{}/content", server.base_url, lesson_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()["content-type"].to_str()?,
        "application/pdf"
    );
    assert!(res.headers()["content-disposition"]
        .to_str()?
        .contains(&stored_name));
    assert_eq!(res.bytes().await?.to_vec(), payload);

    // Deleting the stored file leaves the lesson row pointing at nothing; the
    // inconsistency must surface as 404, not a substitute payload
    let stored_path = std::env::temp_dir()
        .join(format!("lms-test-uploads-{}", server.port))
        .join(&stored_name);
    std::fs::remove_file(&stored_path)?;

    let res = client
        .get(format!("{}/lessons/{}/content", server.base_url, lesson_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn lesson_creation_checks_module_and_type() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = multipart::Form::new()
        .text("title", "Orphan lesson")
        .text("type", "TEXT")
        .text("content", "body");
    let res = client
        .post(format!("{}/lessons/modules/999999999", server.base_url))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let module_id = create_module(&client, &server.base_url).await?;
    let form = multipart::Form::new()
        .text("title", "Mystery lesson")
        .text("type", "AUDIO")
        .text("content", "body");
    let res = client
        .post(format!("{}/lessons/modules/{}", server.base_url, module_id))
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}
