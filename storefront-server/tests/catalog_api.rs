//! Catalog API tests: multipart create/update/delete and image
//! replacement ordering, over an in-memory database and media store

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use shared::models::UserRole;
use storefront_server::core::{Config, ServerState};
use storefront_server::db::DbService;
use storefront_server::db::repository::user::NewUser;
use storefront_server::routes;
use storefront_server::services::MemoryMediaStore;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

struct TestApp {
    app: Router,
    state: ServerState,
    media: Arc<MemoryMediaStore>,
    _work_dir: tempfile::TempDir,
}

async fn spawn_app() -> TestApp {
    let work_dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        work_dir: work_dir.path().to_path_buf(),
        http_port: 0,
        public_url: "http://localhost:8080".to_string(),
        jwt_secret: "integration-test-secret-0123456789abcdef".to_string(),
        log_level: None,
        log_dir: None,
    };
    let db = DbService::open_in_memory().await.expect("db");
    let media = Arc::new(MemoryMediaStore::new());
    let state = ServerState::new(config, db, media.clone());
    TestApp {
        app: routes::build_app(state.clone()),
        state,
        media,
        _work_dir: work_dir,
    }
}

async fn admin_token(app: &TestApp) -> String {
    let user = app
        .state
        .users
        .create(NewUser {
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            role: UserRole::Admin,
            profile_image: None,
        })
        .await
        .expect("user");
    app.state
        .jwt_service
        .generate_token(&user.id.unwrap().to_string(), "Root", UserRole::Admin)
        .expect("token")
}

fn tiny_png() -> Vec<u8> {
    let img = image::RgbImage::new(1, 1);
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("png encode");
    buf.into_inner()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, Vec<u8>),
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"upload.png\"\r\n\
                         Content-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(
    method: http::Method,
    uri: &str,
    parts: &[Part],
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn create_category(app: &TestApp, token: &str, name: &str, slug: &str) -> Value {
    let png = tiny_png();
    let (status, body) = send(
        app,
        multipart_request(
            http::Method::POST,
            "/category",
            &[
                Part::Text("name", name),
                Part::Text("slug", slug),
                Part::File("image", png),
            ],
            Some(token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn category_create_round_trips_and_stores_the_image() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let created = create_category(&app, &token, "Shoes", "shoes").await;
    assert_eq!(created["name"], json!("Shoes"));
    assert_eq!(created["slug"], json!("shoes"));
    assert_eq!(created["parentCategoryId"], Value::Null);
    assert!(created["imageUrl"].as_str().unwrap().ends_with(".jpg"));
    assert_eq!(app.media.len(), 1);

    let (status, body) = send(&app, get("/category", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], json!(1));
    assert_eq!(body["data"][0]["slug"], json!("shoes"));
}

#[tokio::test]
async fn category_mutations_are_privileged() {
    let app = spawn_app().await;
    let png = tiny_png();

    let (status, body) = send(
        &app,
        multipart_request(
            http::Method::POST,
            "/category",
            &[
                Part::Text("name", "Shoes"),
                Part::Text("slug", "shoes"),
                Part::File("image", png),
            ],
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("UNAUTHORIZED"));
    assert!(app.media.is_empty());
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict_and_leaves_no_blob() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    create_category(&app, &token, "Shoes", "shoes").await;

    let png = tiny_png();
    let (status, body) = send(
        &app,
        multipart_request(
            http::Method::POST,
            "/category",
            &[
                Part::Text("name", "Boots"),
                Part::Text("slug", "shoes"),
                Part::File("image", png),
            ],
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"], json!("CONFLICT"));
    assert_eq!(app.media.len(), 1);
}

#[tokio::test]
async fn missing_image_is_a_validation_error() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let (status, body) = send(
        &app,
        multipart_request(
            http::Method::POST,
            "/category",
            &[Part::Text("name", "Shoes"), Part::Text("slug", "shoes")],
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn update_replaces_the_image_only_after_the_new_one_lands() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let created = create_category(&app, &token, "Shoes", "shoes").await;
    let id = created["id"].as_str().unwrap().to_string();
    let old_url = created["imageUrl"].as_str().unwrap().to_string();

    let png = tiny_png();
    let (status, body) = send(
        &app,
        multipart_request(
            http::Method::PUT,
            &format!("/category/{id}"),
            &[Part::Text("name", "Footwear"), Part::File("image", png)],
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], json!("Footwear"));
    assert_eq!(body["data"]["slug"], json!("shoes"));

    let new_url = body["data"]["imageUrl"].as_str().unwrap();
    assert_ne!(new_url, old_url);
    // Old blob is gone, exactly one remains
    assert_eq!(app.media.len(), 1);
}

#[tokio::test]
async fn deleting_a_parent_reparents_children_and_drops_the_blob() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let parent = create_category(&app, &token, "Shoes", "shoes").await;
    let parent_id = parent["id"].as_str().unwrap().to_string();

    let png = tiny_png();
    let (status, child) = send(
        &app,
        multipart_request(
            http::Method::POST,
            "/category",
            &[
                Part::Text("name", "Sneakers"),
                Part::Text("slug", "sneakers"),
                Part::Text("parentId", &parent_id),
                Part::File("image", png),
            ],
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{child}");
    assert_eq!(child["data"]["parentCategoryId"], json!(parent_id.clone()));

    let (status, body) = send(
        &app,
        multipart_request(
            http::Method::DELETE,
            &format!("/category/{parent_id}"),
            &[],
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(app.media.len(), 1);

    // The child is now a top-level category
    let (_, listing) = send(&app, get("/category", None)).await;
    assert_eq!(listing["pagination"]["total"], json!(1));
    assert_eq!(listing["data"][0]["slug"], json!("sneakers"));
    assert_eq!(listing["data"][0]["parentCategoryId"], Value::Null);
}

#[tokio::test]
async fn product_create_requires_images_and_a_real_category() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let category = create_category(&app, &token, "Shoes", "shoes").await;
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        multipart_request(
            http::Method::POST,
            "/product",
            &[
                Part::Text("name", "Runner"),
                Part::Text("description", "a running shoe"),
                Part::Text("price", "19.99"),
                Part::Text("stock", "5"),
                Part::Text("categoryId", &category_id),
            ],
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], json!("VALIDATION_ERROR"));

    let (status, body) = send(
        &app,
        multipart_request(
            http::Method::POST,
            "/product",
            &[
                Part::Text("name", "Runner"),
                Part::Text("description", "a running shoe"),
                Part::Text("price", "19.99"),
                Part::Text("stock", "5"),
                Part::Text("categoryId", "category:missing"),
                Part::File("images", tiny_png()),
            ],
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");

    let (status, body) = send(
        &app,
        multipart_request(
            http::Method::POST,
            "/product",
            &[
                Part::Text("name", "Runner"),
                Part::Text("description", "a running shoe"),
                Part::Text("price", "19.99"),
                Part::Text("stock", "5"),
                Part::Text("categoryId", &category_id),
                Part::File("images", tiny_png()),
                Part::File("images", tiny_png()),
            ],
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["price"], json!(19.99));
    assert_eq!(data["stock"], json!(5));
    assert_eq!(data["category"]["name"], json!("Shoes"));
    assert_eq!(data["imageUrls"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn product_listing_by_category_checks_the_category_first() {
    let app = spawn_app().await;
    let (status, body) = send(&app, get("/product/category/category:missing", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn category_names_are_admin_only() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    create_category(&app, &token, "Shoes", "shoes").await;
    create_category(&app, &token, "Hats", "hats").await;

    let (status, _) = send(&app, get("/category/names", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get("/category/names", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let names = body["data"].as_array().unwrap();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0]["name"], json!("Hats"));
    assert!(names[0].get("slug").is_none());
}
