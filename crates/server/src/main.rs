use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use shared::{
    domain::{ContactField, ProductId},
    error::{ApiError, ErrorCode},
    protocol::{ActionOutcome, OverlayTarget, StorefrontEvent, StorefrontView, UiAction},
};
use storefront_core::InteractionController;
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

#[derive(Debug, Deserialize)]
struct AddToCartForm {
    product_id: String,
}

#[derive(Debug, Deserialize)]
struct OverlayForm {
    target: OverlayTarget,
}

#[derive(Debug, Deserialize)]
struct QuestionForm {
    #[serde(default)]
    question: String,
}

const MAX_QUESTION_BYTES: usize = 2000;
const MAX_CONTACT_FIELD_BYTES: usize = 4000;
const MAX_CONTACT_FIELDS: usize = 16;

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let catalog = settings.load_catalog().map_err(|error| {
        error!(%error, "failed to load product catalog");
        error
    })?;
    info!(products = catalog.len(), "catalog loaded");

    let controller = Arc::new(InteractionController::new(
        catalog,
        settings.controller_options(),
    ));
    let state = AppState {
        controller: Arc::clone(&controller),
        max_body_bytes: settings.max_body_bytes,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "storefront listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    controller.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = RequestBodyLimitLayer::new(state.max_body_bytes);
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/state", get(api_state))
        .route("/api/actions", post(api_dispatch))
        .route("/cart/items", post(form_add_to_cart))
        .route("/cart/close", post(form_close_cart))
        .route("/cart/overlay", post(form_cart_overlay))
        .route("/chat/toggle", post(form_toggle_chat))
        .route("/chat/questions", post(form_ask_question))
        .route("/justifications", post(form_generate_justification))
        .route("/contact", post(form_submit_contact))
        .route("/ws", get(ws_handler))
        .layer(body_limit)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.controller.render_page().await)
}

async fn api_state(State(state): State<Arc<AppState>>) -> Json<StorefrontView> {
    Json(state.controller.snapshot().await)
}

async fn api_dispatch(
    State(state): State<Arc<AppState>>,
    Json(action): Json<UiAction>,
) -> Result<Json<ActionOutcome>, HttpError> {
    validate_action(&action)?;
    Ok(Json(state.controller.dispatch(action).await))
}

async fn form_add_to_cart(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    state
        .controller
        .dispatch(UiAction::AddToCart {
            product_id: ProductId::new(form.product_id),
        })
        .await;
    back_to_page()
}

async fn form_close_cart(State(state): State<Arc<AppState>>) -> Redirect {
    state.controller.dispatch(UiAction::CloseCart).await;
    back_to_page()
}

async fn form_cart_overlay(
    State(state): State<Arc<AppState>>,
    Form(form): Form<OverlayForm>,
) -> Redirect {
    state
        .controller
        .dispatch(UiAction::CartOverlayClick {
            target: form.target,
        })
        .await;
    back_to_page()
}

async fn form_toggle_chat(State(state): State<Arc<AppState>>) -> Redirect {
    state.controller.dispatch(UiAction::ToggleChat).await;
    back_to_page()
}

async fn form_ask_question(
    State(state): State<Arc<AppState>>,
    Form(form): Form<QuestionForm>,
) -> Result<Redirect, HttpError> {
    ensure_question_len(&form.question)?;
    state.controller.ask(form.question).await;
    Ok(back_to_page())
}

async fn form_generate_justification(State(state): State<Arc<AppState>>) -> Redirect {
    state
        .controller
        .dispatch(UiAction::GenerateJustification)
        .await;
    back_to_page()
}

async fn form_submit_contact(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Redirect, HttpError> {
    let fields: Vec<ContactField> = fields
        .into_iter()
        .map(|(name, value)| ContactField { name, value })
        .collect();
    ensure_contact_fields(&fields)?;
    state
        .controller
        .dispatch(UiAction::SubmitContactForm { fields })
        .await;
    Ok(back_to_page())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

async fn ws_connection(state: Arc<AppState>, socket: axum::extract::ws::WebSocket) {
    use axum::extract::ws::Message;
    use futures::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let mut events_rx = state.controller.subscribe();

    let send_task = tokio::spawn(async move {
        while let Some(text) = next_event_text(&mut events_rx).await {
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(_msg)) = receiver.next().await {}

    send_task.abort();
}

/// Next event encoded as JSON. A lagging subscriber skips what it missed and keeps
/// going; `None` means the controller is gone.
async fn next_event_text(events_rx: &mut broadcast::Receiver<StorefrontEvent>) -> Option<String> {
    loop {
        match events_rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(text) => return Some(text),
                Err(error) => warn!(%error, "failed to encode storefront event"),
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "websocket subscriber lagged behind storefront events");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

fn back_to_page() -> Redirect {
    Redirect::to("/")
}

fn validate_action(action: &UiAction) -> Result<(), HttpError> {
    match action {
        UiAction::EditQuestion { text } => ensure_question_len(text),
        UiAction::AskQuestion { question } => ensure_question_len(question),
        UiAction::EditContactField { name, value } => ensure_contact_field(name, value),
        UiAction::SubmitContactForm { fields } => ensure_contact_fields(fields),
        _ => Ok(()),
    }
}

fn ensure_question_len(question: &str) -> Result<(), HttpError> {
    if question.len() > MAX_QUESTION_BYTES {
        return Err(validation_error(
            ErrorCode::QuestionTooLong,
            format!("question exceeds {MAX_QUESTION_BYTES} bytes"),
        ));
    }
    Ok(())
}

fn ensure_contact_fields(fields: &[ContactField]) -> Result<(), HttpError> {
    if fields.len() > MAX_CONTACT_FIELDS {
        return Err(validation_error(
            ErrorCode::TooManyContactFields,
            format!("contact form accepts at most {MAX_CONTACT_FIELDS} fields"),
        ));
    }
    for field in fields {
        ensure_contact_field(&field.name, &field.value)?;
    }
    Ok(())
}

fn ensure_contact_field(name: &str, value: &str) -> Result<(), HttpError> {
    if name.trim().is_empty() {
        return Err(validation_error(
            ErrorCode::InvalidContactField,
            "contact field name cannot be empty",
        ));
    }
    if value.len() > MAX_CONTACT_FIELD_BYTES {
        return Err(validation_error(
            ErrorCode::InvalidContactField,
            format!("contact field '{name}' exceeds {MAX_CONTACT_FIELD_BYTES} bytes"),
        ));
    }
    Ok(())
}

fn validation_error(code: ErrorCode, message: impl Into<String>) -> HttpError {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(code, message)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
