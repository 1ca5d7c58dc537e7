//! End-to-end tests for the upload workflows
//!
//! These drive a live server instance over HTTP with the local storage
//! backend and a real PostgreSQL database. They are skipped when
//! `DATABASE_URL` is not set so the suite stays runnable without a
//! provisioned database.

mod helpers;

use helpers::{
    create_video, file_form, mp4_bytes, png_bytes, register_and_login, spawn_app,
    spawn_app_with_limits, unique_email,
};
use uuid::Uuid;

fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok()
}

macro_rules! require_database {
    () => {
        match database_url() {
            Some(url) => url,
            None => {
                eprintln!("DATABASE_URL not set, skipping end-to-end test");
                return;
            }
        }
    };
}

#[tokio::test]
async fn test_thumbnail_upload_end_to_end() {
    let db = require_database!();
    let app = spawn_app(Some(&db)).await;

    let (_, alice_token, _) = register_and_login(&app, &unique_email("alice")).await;
    let video = create_video(&app, &alice_token, "Demo").await;
    let video_id = video["id"].as_str().unwrap();
    assert!(video["thumbnailURL"].is_null());

    let payload = png_bytes(2048);
    let response = app
        .client
        .post(app.api(&format!("/api/thumbnail_upload/{}", video_id)))
        .bearer_auth(&alice_token)
        .multipart(file_form("thumbnail", "demo.png", "image/png", payload.clone()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let updated: serde_json::Value = response.json().await.unwrap();
    let thumbnail_url = updated["thumbnailURL"].as_str().unwrap();
    assert!(thumbnail_url.ends_with(".png"), "got {thumbnail_url}");

    // The URL resolves to the exact bytes submitted
    let served = app.client.get(thumbnail_url).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.bytes().await.unwrap().as_ref(), payload.as_slice());

    // A non-owner is forbidden, and the record stays intact
    let (_, bob_token, _) = register_and_login(&app, &unique_email("bob")).await;
    let response = app
        .client
        .post(app.api(&format!("/api/thumbnail_upload/{}", video_id)))
        .bearer_auth(&bob_token)
        .multipart(file_form("thumbnail", "b.png", "image/png", png_bytes(512)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let record = app
        .client
        .get(app.api(&format!("/api/videos/{}", video_id)))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap();
    let record: serde_json::Value = record.json().await.unwrap();
    assert_eq!(record["thumbnailURL"].as_str().unwrap(), thumbnail_url);
}

#[tokio::test]
async fn test_second_thumbnail_overwrites_first() {
    let db = require_database!();
    let app = spawn_app(Some(&db)).await;

    let (_, token, _) = register_and_login(&app, &unique_email("alice")).await;
    let video = create_video(&app, &token, "Overwrite me").await;
    let video_id = video["id"].as_str().unwrap();

    let first = png_bytes(1024);
    let mut second = png_bytes(1024);
    second[512] = 0xFF;

    for payload in [&first, &second] {
        let response = app
            .client
            .post(app.api(&format!("/api/thumbnail_upload/{}", video_id)))
            .bearer_auth(&token)
            .multipart(file_form("thumbnail", "t.png", "image/png", payload.clone()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let record = app
        .client
        .get(app.api(&format!("/api/videos/{}", video_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let record: serde_json::Value = record.json().await.unwrap();
    let url = record["thumbnailURL"].as_str().unwrap();

    let served = app.client.get(url).send().await.unwrap();
    assert_eq!(served.bytes().await.unwrap().as_ref(), second.as_slice());
}

#[tokio::test]
async fn test_thumbnail_policy_rejections_leave_record_untouched() {
    let db = require_database!();
    // Tight ceilings keep the oversize case cheap
    let app = spawn_app_with_limits(Some(&db), 4096, 8192).await;

    let (_, token, _) = register_and_login(&app, &unique_email("alice")).await;
    let video = create_video(&app, &token, "Strict").await;
    let video_id = video["id"].as_str().unwrap();

    // Oversized
    let response = app
        .client
        .post(app.api(&format!("/api/thumbnail_upload/{}", video_id)))
        .bearer_auth(&token)
        .multipart(file_form("thumbnail", "big.png", "image/png", png_bytes(8192)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Disallowed content type
    let response = app
        .client
        .post(app.api(&format!("/api/thumbnail_upload/{}", video_id)))
        .bearer_auth(&token)
        .multipart(file_form("thumbnail", "t.gif", "image/gif", png_bytes(512)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Wrong field name counts as a missing file
    let response = app
        .client
        .post(app.api(&format!("/api/thumbnail_upload/{}", video_id)))
        .bearer_auth(&token)
        .multipart(file_form("attachment", "t.png", "image/png", png_bytes(512)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let record = app
        .client
        .get(app.api(&format!("/api/videos/{}", video_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let record: serde_json::Value = record.json().await.unwrap();
    assert!(record["thumbnailURL"].is_null());
}

#[tokio::test]
async fn test_video_upload_end_to_end() {
    let db = require_database!();
    let app = spawn_app(Some(&db)).await;

    let (_, token, _) = register_and_login(&app, &unique_email("alice")).await;
    let video = create_video(&app, &token, "Feature film").await;
    let video_id = video["id"].as_str().unwrap();

    let payload = mp4_bytes(10_240);
    let response = app
        .client
        .post(app.api(&format!("/api/video_upload/{}", video_id)))
        .bearer_auth(&token)
        .multipart(file_form("video", "film.mp4", "video/mp4", payload.clone()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let updated: serde_json::Value = response.json().await.unwrap();
    let video_url = updated["videoURL"].as_str().unwrap();
    assert!(video_url.ends_with(".mp4"), "got {video_url}");
    assert_eq!(updated["fileSize"].as_i64().unwrap(), 10_240);
    assert_eq!(updated["contentType"].as_str().unwrap(), "video/mp4");

    // The durable object name never leaks the record id
    assert!(!video_url.contains(video_id));

    // The URL resolves to the exact bytes submitted
    let served = app.client.get(video_url).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.bytes().await.unwrap().as_ref(), payload.as_slice());

    // No staging artifact survives the request
    assert_eq!(app.staged_file_count(), 0);
}

#[tokio::test]
async fn test_video_policy_rejections_leave_record_untouched() {
    let db = require_database!();
    let app = spawn_app_with_limits(Some(&db), 4096, 8192).await;

    let (_, token, _) = register_and_login(&app, &unique_email("alice")).await;
    let video = create_video(&app, &token, "Strict").await;
    let video_id = video["id"].as_str().unwrap();

    // Oversized
    let response = app
        .client
        .post(app.api(&format!("/api/video_upload/{}", video_id)))
        .bearer_auth(&token)
        .multipart(file_form("video", "big.mp4", "video/mp4", mp4_bytes(8193)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Disallowed content type
    let response = app
        .client
        .post(app.api(&format!("/api/video_upload/{}", video_id)))
        .bearer_auth(&token)
        .multipart(file_form("video", "v.webm", "video/webm", mp4_bytes(512)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let record = app
        .client
        .get(app.api(&format!("/api/videos/{}", video_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let record: serde_json::Value = record.json().await.unwrap();
    assert!(record["videoURL"].is_null());
    assert!(record["fileSize"].is_null());

    assert_eq!(app.staged_file_count(), 0);
}

#[tokio::test]
async fn test_upload_to_unknown_video_is_not_found() {
    let db = require_database!();
    let app = spawn_app(Some(&db)).await;

    let (_, token, _) = register_and_login(&app, &unique_email("alice")).await;

    let response = app
        .client
        .post(app.api(&format!("/api/video_upload/{}", Uuid::new_v4())))
        .bearer_auth(&token)
        .multipart(file_form("video", "v.mp4", "video/mp4", mp4_bytes(512)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_refresh_and_revoke_flow() {
    let db = require_database!();
    let app = spawn_app(Some(&db)).await;

    let (_, _, refresh_token) = register_and_login(&app, &unique_email("alice")).await;

    // A stored refresh token buys a fresh access token
    let response = app
        .client
        .post(app.api("/api/refresh"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let access = body["token"].as_str().unwrap();

    let response = app
        .client
        .get(app.api("/api/videos"))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // After revocation the same refresh token is dead
    let response = app
        .client
        .post(app.api("/api/revoke"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = app
        .client
        .post(app.api("/api/refresh"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_video_listing_is_scoped_to_owner() {
    let db = require_database!();
    let app = spawn_app(Some(&db)).await;

    let (_, alice_token, _) = register_and_login(&app, &unique_email("alice")).await;
    let (_, bob_token, _) = register_and_login(&app, &unique_email("bob")).await;

    create_video(&app, &alice_token, "Alice's cut").await;

    let response = app
        .client
        .get(app.api("/api/videos"))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let videos: serde_json::Value = response.json().await.unwrap();
    assert_eq!(videos.as_array().unwrap().len(), 0);
}
