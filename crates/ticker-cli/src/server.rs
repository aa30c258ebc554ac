//! HTTP front-end
//!
//! `POST /chat` takes `{selected_stock, user_input}` and answers with
//! `{response}` when the text came from the text-generation service, or
//! `{result}` for comparison and no-match replies.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use ticker_stock::{StockChat, UserTurn};
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub selected_stock: String,
    pub user_input: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Result { result: String },
    Response { response: String },
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Build the router over a shared chat
pub fn router(chat: Arc<StockChat>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat_turn))
        .with_state(chat)
}

/// Serve until Ctrl-C
pub async fn serve(chat: Arc<StockChat>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, router(chat))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
        .context("server terminated with error")?;

    info!("Server stopped");
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn chat_turn(State(chat): State<Arc<StockChat>>, Json(request): Json<ChatRequest>) -> Response {
    let turn = UserTurn::new(request.selected_stock, request.user_input);

    match chat.handle_turn(&turn).await {
        Ok(reply) if reply.is_explanation() => Json(ChatResponse::Response {
            response: reply.into_text(),
        })
        .into_response(),
        Ok(reply) => Json(ChatResponse::Result {
            result: reply.into_text(),
        })
        .into_response(),
        Err(e) if e.is_client_error() => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            error!("Chat turn for {} failed: {}", turn.ticker, e);
            (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
