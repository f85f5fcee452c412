// tests/common/mod.rs
#![allow(dead_code)]

use axum::Router;

/// Serve `router` on an ephemeral localhost port; returns `http://127.0.0.1:<port>`.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });
    format!("http://{addr}")
}
