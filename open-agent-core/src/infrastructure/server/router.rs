use super::docs::ApiDoc;
use super::error::ServerError;
use super::routes;
use super::state::ServerState;
use crate::agent::Agent;
use crate::model::CompletionBackend;
use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// The REST application without a listener; `serve` binds it.
pub fn router<B>(agent: Arc<Agent<B>>) -> Router
where
    B: CompletionBackend + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(ServerState::new(agent));
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/chat", post(routes::chat::chat_handler::<B>))
        .route("/tools", get(routes::tools::tools_handler::<B>))
        .route("/tool/{name}", post(routes::tool::tool_call_handler::<B>))
        .layer(cors)
        .with_state(state)
}

pub(super) async fn serve<B>(agent: Arc<Agent<B>>, addr: SocketAddr) -> Result<(), ServerError>
where
    B: CompletionBackend + 'static,
{
    info!(%addr, "Binding REST server");
    let manager = Arc::clone(agent.tools().manager());
    let app = router(agent);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Shutting down, disconnecting tool servers");
    manager.disconnect_all().await;
    served.map_err(|source| ServerError::Serve { addr, source })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(%err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
