// tests/api_tests.rs

use std::sync::Arc;

use board_backend::{
    config::Config, routes, state::AppState, store::MemoryStore, utils::jwt::sign_jwt,
};
use serde_json::{Value, json};

const SECRET: &str = "test_secret_for_integration_tests";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let config = Config {
        database_url: None,
        jwt_secret: SECRET.to_string(),
        rust_log: "error".to_string(),
        max_reply_depth: 3,
        port: 0,
    };

    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        config,
    };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// A fresh user id and a bearer token for it.
fn new_user() -> (String, String) {
    let user_id = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let token = sign_jwt(&user_id, SECRET, 600).unwrap();
    (user_id, token)
}

async fn create_post(client: &reqwest::Client, address: &str, token: &str, content: &str) -> i64 {
    let resp = client
        .post(format!("{}/api/posts", address))
        .bearer_auth(token)
        .json(&json!({ "content": content, "tag": "career" }))
        .send()
        .await
        .expect("Failed to create post");
    assert_eq!(resp.status().as_u16(), 201);
    resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
}

async fn create_comment(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    post_id: i64,
    parent_id: Option<i64>,
) -> reqwest::Response {
    client
        .post(format!("{}/api/posts/{}/comments", address, post_id))
        .bearer_auth(token)
        .json(&json!({ "content": "a comment", "parent_id": parent_id }))
        .send()
        .await
        .expect("Failed to create comment")
}

async fn vote(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    path: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/{}/vote", address, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to vote")
}

#[tokio::test]
async fn unknown_path_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn requests_without_valid_token_are_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let missing = client
        .get(format!("{}/api/posts", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 401);

    let forged = sign_jwt("mallory", "wrong_secret", 600).unwrap();
    let bad = client
        .get(format!("{}/api/posts", address))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 401);
}

#[tokio::test]
async fn create_post_validates_and_sanitizes() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = new_user();

    let empty_tag = client
        .post(format!("{}/api/posts", address))
        .bearer_auth(&token)
        .json(&json!({ "content": "hello", "tag": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_tag.status().as_u16(), 400);

    let id = create_post(&client, &address, &token, "  offer <script>x</script>accepted ").await;
    let post: Value = client
        .get(format!("{}/api/posts/{}", address, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["content"], "offer accepted");
    assert_eq!(post["score"], 0);
    assert_eq!(post["comment_count"], 0);

    let missing = client
        .get(format!("{}/api/posts/{}", address, id + 100))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn post_votes_follow_tally_rules() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (user, token) = new_user();
    let post_id = create_post(&client, &address, &token, "interview tips").await;
    let path = format!("posts/{}", post_id);

    // Up, then down: net swing of two.
    let up: Value = vote(&client, &address, &token, &path, json!({ "vote": 1 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(up["score"], 1);
    let down: Value = vote(&client, &address, &token, &path, json!({ "vote": -1 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(down["score"], -1);
    assert_eq!(down["votes"][&user], -1);

    // Same vote again changes nothing.
    let again: Value = vote(&client, &address, &token, &path, json!({ "vote": -1 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(again, down);

    // Clicking the active direction with toggle clears the vote.
    let cleared: Value = vote(
        &client,
        &address,
        &token,
        &path,
        json!({ "vote": -1, "toggle": true }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(cleared["score"], 0);
    assert_eq!(cleared["votes"][&user], 0);

    let invalid = vote(&client, &address, &token, &path, json!({ "vote": 2 })).await;
    assert_eq!(invalid.status().as_u16(), 400);
    let body: Value = invalid.json().await.expect("Error body should be JSON");
    assert!(body["error"].as_str().unwrap().contains("Invalid vote 2"));

    let missing = vote(&client, &address, &token, "posts/9999", json!({ "vote": 1 })).await;
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn three_users_upvote_and_top_sort() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = new_user();

    let popular = create_post(&client, &address, &token, "popular").await;
    let newest = create_post(&client, &address, &token, "newest").await;

    for _ in 0..3 {
        let (_, voter) = new_user();
        let resp = vote(
            &client,
            &address,
            &voter,
            &format!("posts/{}", popular),
            json!({ "vote": 1 }),
        )
        .await;
        assert_eq!(resp.status().as_u16(), 200);
    }

    let list = |sort: &'static str| {
        let client = client.clone();
        let address = address.clone();
        let token = token.clone();
        async move {
            client
                .get(format!("{}/api/posts?sort={}", address, sort))
                .bearer_auth(token)
                .send()
                .await
                .unwrap()
                .json::<Vec<Value>>()
                .await
                .unwrap()
        }
    };

    let top = list("top").await;
    assert_eq!(top[0]["id"], popular);
    assert_eq!(top[0]["score"], 3);

    let new = list("new").await;
    assert_eq!(new[0]["id"], newest);
}

#[tokio::test]
async fn comment_forest_nests_replies_and_limits_reply_depth() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = new_user();
    let post_id = create_post(&client, &address, &token, "thread").await;

    let mut parent = None;
    let mut chain = Vec::new();
    for _ in 0..4 {
        let resp = create_comment(&client, &address, &token, post_id, parent).await;
        assert_eq!(resp.status().as_u16(), 201);
        let id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();
        chain.push(id);
        parent = Some(id);
    }

    let forest: Vec<Value> = client
        .get(format!("{}/api/posts/{}/comments", address, post_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(forest.len(), 1);
    let n1 = &forest[0];
    let n2 = &n1["children"][0];
    let n3 = &n2["children"][0];
    let n4 = &n3["children"][0];
    assert_eq!(n1["id"], chain[0]);
    assert_eq!(n4["id"], chain[3]);
    assert_eq!(n3["depth"], 2);
    assert_eq!(n3["can_reply"], true);
    assert_eq!(n4["depth"], 3);
    assert_eq!(n4["can_reply"], false);

    // The deepest comment cannot take a reply, so chains stay bounded.
    let too_deep = create_comment(&client, &address, &token, post_id, Some(chain[3])).await;
    assert_eq!(too_deep.status().as_u16(), 400);
    let body: Value = too_deep.json().await.unwrap();
    assert!(body["error"].is_string());

    let post: Value = client
        .get(format!("{}/api/posts/{}", address, post_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["comment_count"], 4);
}

#[tokio::test]
async fn comment_length_is_checked_after_sanitizing() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = new_user();
    let post_id = create_post(&client, &address, &token, "post").await;

    // 600 raw characters pass the request rule but escape to 3000.
    let resp = client
        .post(format!("{}/api/posts/{}/comments", address, post_id))
        .bearer_auth(&token)
        .json(&json!({ "content": "&".repeat(600) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let post: Value = client
        .get(format!("{}/api/posts/{}", address, post_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["comment_count"], 0);
}

#[tokio::test]
async fn replies_must_target_a_comment_of_the_same_post() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = new_user();
    let first = create_post(&client, &address, &token, "first").await;
    let second = create_post(&client, &address, &token, "second").await;

    let root = create_comment(&client, &address, &token, first, None)
        .await
        .json::<Value>()
        .await
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let cross = create_comment(&client, &address, &token, second, Some(root)).await;
    assert_eq!(cross.status().as_u16(), 404);

    let no_post = create_comment(&client, &address, &token, 9999, None).await;
    assert_eq!(no_post.status().as_u16(), 404);

    let empty: Vec<Value> = client
        .get(format!("{}/api/posts/{}/comments", address, second))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn comment_votes_are_tallied() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (user, token) = new_user();
    let post_id = create_post(&client, &address, &token, "post").await;
    let comment_id = create_comment(&client, &address, &token, post_id, None)
        .await
        .json::<Value>()
        .await
        .unwrap()["id"]
        .as_i64()
        .unwrap();
    let path = format!("comments/{}", comment_id);

    vote(&client, &address, &token, &path, json!({ "vote": 1 })).await;
    let cleared: Value = vote(&client, &address, &token, &path, json!({ "vote": 0 }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(cleared["score"], 0);
    assert_eq!(cleared["votes"][&user], 0);

    let missing = vote(&client, &address, &token, "comments/9999", json!({ "vote": 1 })).await;
    assert_eq!(missing.status().as_u16(), 404);
}
