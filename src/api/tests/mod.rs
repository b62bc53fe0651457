use super::*;
use crate::error::{MailError, StoreError};
use crate::test_helpers::{
    Call, Journal, panicking_notifier_pipeline, panicking_pipeline, recording_pipeline,
};
use crate::types::{Notification, Report};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{Value, json};
use tower::ServiceExt; // for oneshot()


fn test_config() -> Config {
    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1:0".parse().unwrap();
    config
}

/// Router over recording fakes; `None` means the collaborator succeeds.
fn test_router(
    store_failure: Option<StoreError>,
    mail_failure: Option<MailError>,
) -> (Router, Journal) {
    let (pipeline, journal) = recording_pipeline(store_failure, mail_failure);
    (
        create_router(Arc::new(pipeline), Arc::new(test_config())),
        journal,
    )
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_serves_and_shuts_down() {
    let (pipeline, _journal) = recording_pipeline(None, None);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(serve(
        listener,
        Arc::new(pipeline),
        Arc::new(test_config()),
        async move {
            stop_rx.await.ok();
        },
    ));

    let response = reqwest::get(format!("http://{address}/health")).await.unwrap();
    assert_eq!(response.status(), 200);

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_start_api_server_reports_bind_failure() {
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = test_config();
    config.server.bind_address = occupied.local_addr().unwrap();
    let (pipeline, _journal) = recording_pipeline(None, None);

    let result = start_api_server(Arc::new(pipeline), Arc::new(config)).await;

    assert!(matches!(result, Err(crate::error::Error::Io(_))));
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let (app, _journal) = test_router(None, None);

    let responses = [
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap(),
        app.clone()
            .oneshot(post_json("/relato", &json!({})))
            .await
            .unwrap(),
        app.oneshot(
            Request::builder()
                .uri("/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap(),
    ];

    for response in responses {
        let headers = response.headers();
        assert_eq!(headers["referrer-policy"], "no-referrer");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["cross-origin-resource-policy"], "same-site");
        assert_eq!(headers["permissions-policy"], "interest-cohort=()");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    }
}

#[tokio::test]
async fn test_handler_panic_becomes_json_500() {
    let (pipeline, journal) = panicking_pipeline();
    let app = create_router(Arc::new(pipeline), Arc::new(test_config()));

    let response = app
        .oneshot(post_json(
            "/relato",
            &json!({"text": "x", "timestampISO": "iso", "timestampDisplay": "display"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");
    assert_eq!(
        json_body(response).await,
        json!({"error": "Falha ao processar relato", "details": "store client exploded"})
    );
    assert!(journal.sends().is_empty());
}

#[tokio::test]
async fn test_server_survives_a_panicking_request() {
    let (pipeline, _journal) = panicking_pipeline();
    let app = create_router(Arc::new(pipeline), Arc::new(test_config()));
    let valid = json!({"text": "x", "timestampISO": "iso", "timestampDisplay": "display"});

    let first = app.clone().oneshot(post_json("/relato", &valid)).await.unwrap();
    let second = app.oneshot(post_json("/relato", &valid)).await.unwrap();

    assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_notifier_panic_after_append_keeps_persisted_flag() {
    let (pipeline, journal) = panicking_notifier_pipeline();
    let app = create_router(Arc::new(pipeline), Arc::new(test_config()));

    let response = app
        .oneshot(post_json(
            "/relato",
            &json!({"text": "x", "timestampISO": "iso", "timestampDisplay": "display"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "Falha ao processar relato",
            "details": "notifier panicked: notifier exploded",
            "persisted": true
        })
    );
    assert_eq!(journal.appends().len(), 1);
}
