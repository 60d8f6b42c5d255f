//! Integration tests for the kernel server routes and session.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use elm_kernel_core::{ExecuteStatus, KernelConfig};
use elm_kernel_server::{AppState, KernelSession, ServerMessage, create_router};
use tokio::sync::{Mutex, Notify};
use tower::ServiceExt;

fn app_state(config: KernelConfig) -> Arc<AppState> {
    let (session, _rx) = KernelSession::new(config).expect("Failed to create session");
    Arc::new(AppState {
        session: Arc::new(Mutex::new(session)),
        shutdown: Arc::new(Notify::new()),
    })
}

async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_route() {
    let (status, json) = get_json(app_state(KernelConfig::default()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_kernel_info_route() {
    let (status, json) = get_json(app_state(KernelConfig::default()), "/api/kernel_info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["implementation"], "elm_kernel");
    assert_eq!(json["language_info"]["name"], "elm");
}

#[cfg(unix)]
#[test]
fn test_successful_compile_broadcasts_displays() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().unwrap();
    let compiler = dir.path().join("fake-elm-make");
    fs::write(
        &compiler,
        "#!/bin/sh\nprintf 'var x = 1;' > \"${3#--output=}\"\n",
    )
    .unwrap();
    fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755)).unwrap();

    let config = KernelConfig::default()
        .with_compiler(&compiler)
        .with_project_dir(dir.path());
    let (mut session, mut rx) = KernelSession::new(config).unwrap();

    session.execute("a", "module Main exposing (main)", false);
    let reply = session.execute("b", "-- compile-code\nmain = text \"hi\"", false);

    match reply {
        ServerMessage::ExecuteReply {
            parent_id,
            status,
            execution_count,
            ..
        } => {
            assert_eq!(parent_id, "b");
            assert_eq!(status, ExecuteStatus::Ok);
            assert_eq!(execution_count, 2);
        }
        other => panic!("Unexpected reply: {:?}", other),
    }

    let mut displays = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        if let ServerMessage::DisplayData {
            parent_id, data, ..
        } = msg
        {
            assert_eq!(parent_id, "b");
            displays.push(data);
        }
    }

    assert_eq!(displays.len(), 2);
    assert_eq!(
        displays[0].text_html.as_deref(),
        Some("<div id=\"elm-div-2\"></div>")
    );
    let script = displays[1].application_javascript.as_deref().unwrap();
    assert!(script.contains("var x = 1;"));
    assert!(script.contains("Elm.Main.embed"));
}
