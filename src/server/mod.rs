//! Task Resource API: router, middleware and the `serve` entry point.

pub mod error;
pub mod handlers;
pub mod state;

use anyhow::Context;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::config::ServeArgs;
pub use state::{AppState, Store};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/tasks/{id}",
            get(handlers::show_task).put(handlers::update_task).delete(handlers::delete_task),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Open the store, bind the listener and serve until Ctrl-C.
pub async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let store = if args.memory {
        Store::in_memory()
    } else {
        Store::open(&args.db).with_context(|| format!("failed to open task store {}", args.db.display()))?
    };
    let loaded = store.len().await;
    match store.path() {
        Some(path) => info!(path = %path.display(), tasks = loaded, "task store loaded"),
        None => info!("using in-memory task store"),
    }

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %listener.local_addr()?, "task API listening");

    axum::serve(listener, router(AppState::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("task API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Serve an empty in-memory store on an ephemeral port; returns its base URL.
#[cfg(test)]
pub async fn spawn_test_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(Store::in_memory()));
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(Store::in_memory()))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn create(app: &Router, body: Value) -> Value {
        let (status, task) = send(app, Method::POST, "/tasks", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        task
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let resp = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn create_without_description_defaults_fields() {
        let app = app();
        let task = create(&app, json!({"title": "Buy milk"})).await;
        assert_eq!(task["id"], 1);
        assert_eq!(task["completed"], false);
        assert_eq!(task["description"], Value::Null);
        assert!(task["created_at"].is_string());
        assert!(task["updated_at"].is_string());
    }

    #[tokio::test]
    async fn create_with_empty_title_persists_nothing() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/tasks", Some(json!({"title": ""}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["title"], json!(["The title field is required."]));
        assert_eq!(body["message"], "The title field is required.");

        let (_, list) = send(&app, Method::GET, "/tasks", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn create_with_256_char_title_fails() {
        let app = app();
        let (status, body) =
            send(&app, Method::POST, "/tasks", Some(json!({"title": "a".repeat(256)}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["errors"]["title"],
            json!(["The title field must not be greater than 255 characters."])
        );

        let task = create(&app, json!({"title": "a".repeat(255)})).await;
        assert_eq!(task["title"].as_str().unwrap().len(), 255);
    }

    #[tokio::test]
    async fn create_ignores_fields_outside_the_allow_list() {
        let app = app();
        let task = create(
            &app,
            json!({"title": "x", "id": 42, "completed": true, "created_at": "1999-01-01T00:00:00Z"}),
        )
        .await;
        assert_eq!(task["id"], 1);
        assert_eq!(task["completed"], false);
        assert_ne!(task["created_at"], "1999-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn malformed_bodies_are_bad_requests() {
        let app = app();
        let req = Request::post("/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::POST, "/tasks", Some(json!(["title"]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reading_unknown_ids_is_not_found() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/tasks/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Task 99 not found.");

        let (status, _) = send(&app, Method::GET, "/tasks/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_changes_title_and_keeps_id() {
        let app = app();
        let task = create(&app, json!({"title": "Buy milk", "description": "2%"})).await;
        let (status, updated) =
            send(&app, Method::PUT, "/tasks/1", Some(json!({"title": "Buy bread"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], task["id"]);
        assert_eq!(updated["title"], "Buy bread");
        assert_eq!(updated["description"], "2%");
        assert_eq!(updated["created_at"], task["created_at"]);

        let (_, read) = send(&app, Method::GET, "/tasks/1", None).await;
        assert_eq!(read, updated);
    }

    #[tokio::test]
    async fn update_checks_id_before_body() {
        let app = app();
        let (status, _) = send(&app, Method::PUT, "/tasks/5", Some(json!({"title": ""}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        create(&app, json!({"title": "x"})).await;
        let (status, body) = send(&app, Method::PUT, "/tasks/1", Some(json!({"description": "d"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["title"].is_array());
    }

    #[tokio::test]
    async fn toggling_twice_restores_completion() {
        let app = app();
        let original = create(&app, json!({"title": "Buy milk"})).await;

        let mut flipped = original.clone();
        flipped["completed"] = json!(true);
        let (_, once) = send(&app, Method::PUT, "/tasks/1", Some(flipped)).await;
        assert_eq!(once["completed"], true);

        let mut back = once.clone();
        back["completed"] = json!(false);
        let (_, twice) = send(&app, Method::PUT, "/tasks/1", Some(back)).await;
        assert_eq!(twice["completed"], original["completed"]);
    }

    #[tokio::test]
    async fn delete_then_read_is_not_found() {
        let app = app();
        create(&app, json!({"title": "x"})).await;
        let (status, body) = send(&app, Method::DELETE, "/tasks/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::GET, "/tasks/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, "/tasks/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_is_in_insertion_order() {
        let app = app();
        for title in ["first", "second", "third"] {
            create(&app, json!({"title": title})).await;
        }
        let (status, list) = send(&app, Method::GET, "/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = list.as_array().unwrap().iter().map(|t| t["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn buy_milk_lifecycle() {
        let app = app();
        let task = create(&app, json!({"title": "Buy milk", "description": "2%"})).await;
        let id = task["id"].as_u64().unwrap();
        let uri = format!("/tasks/{id}");

        let (status, list) = send(&app, Method::GET, "/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list, json!([task]));

        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({"title": "Buy milk", "description": "2%", "completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["completed"], true);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/tasks")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
