mod action_log;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "4000".into())
        .parse()
        .expect("invalid PORT");
    let bind = std::env::var("INKROOM_BIND").unwrap_or_else(|_| "0.0.0.0".into());

    let state = state::AppState::new();
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%bind, %port, "inkroom gateway listening");
    axum::serve(listener, app).await.expect("server failed");
}
