//! Router-level tests: accounts, the session guard and the watched list

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use trackflix_config::ServerConfig;
use trackflix_server::{build_router, AppState, UserStore};

const EMAIL: &str = "ana@example.com";
const PASSWORD: &str = "hunter2";

fn setup_app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = UserStore::new(dir.path().join("users")).unwrap();
    // Lowest bcrypt cost keeps the suite fast
    let state = AppState::new(store, 4);
    let router = build_router(state, &ServerConfig::default()).unwrap();
    (router, dir)
}

fn json_request(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn movie(imdb_id: &str, user_rating: u8) -> Value {
    json!({
        "imdbID": imdb_id,
        "title": "Inception",
        "year": "2010",
        "poster": "N/A",
        "imdbRating": 8.8,
        "runtime": 148,
        "userRating": user_rating,
        "countRatingDecisions": 2
    })
}

async fn signup(app: &Router, email: &str) -> StatusCode {
    let body = json!({ "name": "Ana", "email": email, "password": PASSWORD });
    let response = app.clone().oneshot(json_request("/signup", body, None)).await.unwrap();
    response.status()
}

/// Sign up and log in, returning the `name=value` cookie pair
async fn login(app: &Router, email: &str) -> String {
    assert_eq!(signup(app, email).await, StatusCode::CREATED);
    let body = json!({ "email": email, "password": PASSWORD });
    let response = app.clone().oneshot(json_request("/login", body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    assert_eq!(extract_json(response.into_body()).await, json!("Success"));
    cookie
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _dir) = setup_app();
    let response = app.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "trackflix-server");
}

#[tokio::test]
async fn test_signup_returns_public_record() {
    let (app, _dir) = setup_app();
    let body = json!({ "name": "Ana", "email": EMAIL, "password": PASSWORD });
    let response = app.clone().oneshot(json_request("/signup", body, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let user = extract_json(response.into_body()).await;
    assert_eq!(user["email"], EMAIL);
    assert_eq!(user["name"], "Ana");
    assert!(user.get("password").is_none());

    assert_eq!(signup(&app, EMAIL).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures() {
    let (app, _dir) = setup_app();
    let unknown = json!({ "email": "ghost@example.com", "password": PASSWORD });
    let response = app.clone().oneshot(json_request("/login", unknown, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    signup(&app, EMAIL).await;
    let wrong = json!({ "email": EMAIL, "password": "nope" });
    let response = app.clone().oneshot(json_request("/login", wrong, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Password doesn't match");
}

#[tokio::test]
async fn test_current_user_requires_session() {
    let (app, _dir) = setup_app();
    let response = app.clone().oneshot(get_request("/user", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login(&app, EMAIL).await;
    let response = app.clone().oneshot(get_request("/user", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["user"]["email"], EMAIL);
}

#[tokio::test]
async fn test_mutations_require_session() {
    let (app, _dir) = setup_app();
    signup(&app, EMAIL).await;

    let body = json!({ "email": EMAIL, "movie": movie("tt1375666", 8) });
    let response = app.clone().oneshot(json_request("/add-movie", body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json!({ "email": EMAIL, "imdbID": "tt1375666" });
    let response = app.clone().oneshot(json_request("/remove-movie", body, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_then_remove_returns_full_collection() {
    let (app, _dir) = setup_app();
    let cookie = login(&app, EMAIL).await;

    let body = json!({ "email": EMAIL, "movie": movie("tt1375666", 8) });
    let response = app
        .clone()
        .oneshot(json_request("/add-movie", body, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let watched = extract_json(response.into_body()).await;
    assert_eq!(watched.as_array().unwrap().len(), 1);
    assert_eq!(watched[0]["imdbID"], "tt1375666");
    assert_eq!(watched[0]["userRating"], 8);

    let uri = format!("/user-movies?email={}", urlencoding_email(EMAIL));
    let response = app.clone().oneshot(get_request(&uri, None)).await.unwrap();
    assert_eq!(extract_json(response.into_body()).await, watched);

    let body = json!({ "email": EMAIL, "imdbID": "tt1375666" });
    let response = app
        .clone()
        .oneshot(json_request("/remove-movie", body, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, json!([]));
}

#[tokio::test]
async fn test_duplicate_add_keeps_existing_entry() {
    let (app, _dir) = setup_app();
    let cookie = login(&app, EMAIL).await;

    for rating in [8, 3] {
        let body = json!({ "email": EMAIL, "movie": movie("tt1375666", rating) });
        let response = app
            .clone()
            .oneshot(json_request("/add-movie", body, Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let watched = extract_json(response.into_body()).await;
        assert_eq!(watched.as_array().unwrap().len(), 1);
        assert_eq!(watched[0]["userRating"], 8);
    }
}

#[tokio::test]
async fn test_invalid_rating_rejected() {
    let (app, _dir) = setup_app();
    let cookie = login(&app, EMAIL).await;

    let body = json!({ "email": EMAIL, "movie": movie("tt1375666", 0) });
    let response = app
        .clone()
        .oneshot(json_request("/add-movie", body, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_incomplete_movie_body_is_json_error() {
    let (app, _dir) = setup_app();
    let cookie = login(&app, EMAIL).await;

    let body = json!({ "email": EMAIL, "movie": { "imdbID": "tt2" } });
    let response = app
        .clone()
        .oneshot(json_request("/add-movie", body, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("application/json"));
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn test_malformed_signup_body_is_json_error() {
    let (app, _dir) = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": \"Ana\""))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_padded_email_matches_session_everywhere() {
    let (app, _dir) = setup_app();
    let padded = format!(" {} ", EMAIL);
    let cookie = login(&app, &padded).await;

    let body = json!({ "email": padded, "movie": movie("tt1375666", 8) });
    let response = app
        .clone()
        .oneshot(json_request("/add-movie", body, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/user-movies?email=%20{}%20", urlencoding_email(EMAIL));
    let response = app.clone().oneshot(get_request(&uri, None)).await.unwrap();
    let watched = extract_json(response.into_body()).await;
    assert_eq!(watched[0]["imdbID"], "tt1375666");

    let body = json!({ "email": EMAIL, "imdbID": "tt1375666" });
    let response = app
        .clone()
        .oneshot(json_request("/remove-movie", body, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, json!([]));
}

#[tokio::test]
async fn test_other_users_list_is_forbidden() {
    let (app, _dir) = setup_app();
    let cookie = login(&app, EMAIL).await;
    signup(&app, "bob@example.com").await;

    let body = json!({ "email": "bob@example.com", "movie": movie("tt1375666", 8) });
    let response = app
        .clone()
        .oneshot(json_request("/add-movie", body, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_user_movies_is_empty() {
    let (app, _dir) = setup_app();
    let response = app
        .oneshot(get_request("/user-movies?email=ghost%40example.com", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, json!([]));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (app, _dir) = setup_app();
    let cookie = login(&app, EMAIL).await;

    let response = app
        .clone()
        .oneshot(json_request("/logout", json!({}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get_request("/user", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json!({ "email": EMAIL, "movie": movie("tt1375666", 8) });
    let response = app
        .oneshot(json_request("/add-movie", body, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

fn urlencoding_email(email: &str) -> String {
    email.replace('@', "%40")
}
