//! Axum web server with WebSocket streaming for visualization.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use algoscope_graph::{EditOutcome, EditorMode, NodeId, Position};

use crate::catalog::{Catalog, Topic};
use crate::config::VisConfig;
use crate::content::{ContentService, GeneratedContent, OfflineGenerator};
use crate::error::{Error, Result};
use crate::session::{DragPhase, InputRequest, Session, SessionHandle, SessionView};
use crate::structure::StructureEdit;

/// Shared application state.
pub struct AppState {
    config: VisConfig,
    catalog: Catalog,
    content: ContentService<OfflineGenerator>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl AppState {
    /// Session for a topic, created on first use.
    async fn session(&self, id: &str) -> Result<SessionHandle> {
        if let Some(handle) = self.sessions.read().await.get(id) {
            return Ok(handle.clone());
        }
        let topic = self
            .catalog
            .get(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("topic {id}")))?;
        let session = Session::new(topic, &self.config)?;
        let mut sessions = self.sessions.write().await;
        let handle = sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionHandle::new(session));
        Ok(handle.clone())
    }

    /// Run `f` against a session and return its fresh view.
    async fn update(&self, id: &str, f: impl FnOnce(&mut Session) -> Result<()>) -> Result<Json<SessionView>> {
        let handle = self.session(id).await?;
        let mut session = handle.lock().await;
        f(&mut session)?;
        Ok(Json(session.view()))
    }
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server with the built-in topics and offline content.
    pub fn new(config: VisConfig) -> Self {
        Self::with_catalog(config, Catalog::with_defaults())
    }

    pub fn with_catalog(config: VisConfig, catalog: Catalog) -> Self {
        Self {
            state: Arc::new(AppState {
                config,
                catalog,
                content: ContentService::new(OfflineGenerator),
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            // Catalog and content
            .route("/api/topics", get(topics_handler))
            .route("/api/topics/{id}", get(topic_handler))
            .route("/api/topics/{id}/content", get(content_handler))
            // Playback
            .route("/api/vis/{id}", get(view_handler))
            .route("/api/vis/{id}/start", post(start_handler))
            .route("/api/vis/{id}/pause", post(pause_handler))
            .route("/api/vis/{id}/step", post(step_handler))
            .route("/api/vis/{id}/reset", post(reset_handler))
            .route("/api/vis/{id}/speed", post(speed_handler))
            // Inputs
            .route("/api/vis/{id}/size", post(size_handler))
            .route("/api/vis/{id}/regenerate", post(regenerate_handler))
            .route("/api/vis/{id}/input", post(input_handler))
            .route("/api/vis/{id}/graph/mode", post(mode_handler))
            .route("/api/vis/{id}/graph/click", post(click_handler))
            .route("/api/vis/{id}/graph/drag", post(drag_handler))
            .route("/api/vis/{id}/graph/start-node", post(start_node_handler))
            .route("/api/vis/{id}/graph/end-node", post(end_node_handler))
            .route("/api/vis/{id}/graph/weight", post(weight_handler))
            .route("/api/vis/{id}/structure/push", post(push_handler))
            .route("/api/vis/{id}/structure/pop", post(pop_handler))
            .route("/api/vis/{id}/structure", post(structure_handler))
            // WebSocket for real-time updates
            .route("/ws/{id}", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured port.
    pub async fn serve(self) -> std::result::Result<(), std::io::Error> {
        let port = self.state.config.port;
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Algoscope running on http://localhost:{}", port);
        axum::serve(listener, self.router()).await
    }
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn topics_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Topic>> {
    Json(state.catalog.list().await)
}

async fn topic_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Topic>> {
    state
        .catalog
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("topic {id}")))
}

async fn content_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GeneratedContent>> {
    let topic = state
        .catalog
        .get(&id)
        .await
        .ok_or_else(|| Error::NotFound(format!("topic {id}")))?;
    Ok(Json(state.content.content(&topic).await))
}

async fn view_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<SessionView>> {
    state.update(&id, |_| Ok(())).await
}

async fn start_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<SessionView>> {
    let handle = state.session(&id).await?;
    Ok(Json(handle.start().await?))
}

async fn pause_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<SessionView>> {
    state
        .update(&id, |s| {
            s.pause();
            Ok(())
        })
        .await
}

async fn step_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<SessionView>> {
    state.update(&id, Session::step).await
}

async fn reset_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<SessionView>> {
    state.update(&id, Session::reset).await
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed: u8,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SpeedRequest>,
) -> Result<Json<SessionView>> {
    state
        .update(&id, |s| {
            s.set_speed(req.speed);
            Ok(())
        })
        .await
}

#[derive(Deserialize)]
struct SizeRequest {
    size: usize,
}

async fn size_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SizeRequest>,
) -> Result<Json<SessionView>> {
    state.update(&id, |s| s.set_array_size(req.size)).await
}

async fn regenerate_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>> {
    state.update(&id, Session::regenerate).await
}

async fn input_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<InputRequest>,
) -> Result<Json<SessionView>> {
    state.update(&id, |s| s.set_input(req)).await
}

#[derive(Deserialize)]
struct ModeRequest {
    mode: EditorMode,
}

async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<SessionView>> {
    state.update(&id, |s| s.set_mode(req.mode)).await
}

#[derive(Deserialize)]
struct PointerRequest {
    x: f32,
    y: f32,
    #[serde(default)]
    phase: Option<DragPhase>,
}

/// Result of a pointer gesture plus the view after it.
#[derive(Serialize)]
struct GestureResponse {
    outcome: EditOutcome,
    view: SessionView,
}

async fn click_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PointerRequest>,
) -> Result<Json<GestureResponse>> {
    let handle = state.session(&id).await?;
    let mut session = handle.lock().await;
    let outcome = session.click(Position::new(req.x, req.y))?;
    Ok(Json(GestureResponse {
        outcome,
        view: session.view(),
    }))
}

async fn drag_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PointerRequest>,
) -> Result<Json<GestureResponse>> {
    let handle = state.session(&id).await?;
    let mut session = handle.lock().await;
    let phase = req.phase.unwrap_or(DragPhase::Move);
    let outcome = session.drag(phase, Position::new(req.x, req.y))?;
    Ok(Json(GestureResponse {
        outcome,
        view: session.view(),
    }))
}

#[derive(Deserialize)]
struct StartNodeRequest {
    node: u32,
}

async fn start_node_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<StartNodeRequest>,
) -> Result<Json<SessionView>> {
    state.update(&id, |s| s.set_start_node(NodeId(req.node))).await
}

/// `null` clears the destination.
#[derive(Deserialize)]
struct EndNodeRequest {
    node: Option<u32>,
}

async fn end_node_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<EndNodeRequest>,
) -> Result<Json<SessionView>> {
    state.update(&id, |s| s.set_end_node(req.node.map(NodeId))).await
}

#[derive(Deserialize)]
struct WeightRequest {
    weight: i64,
}

async fn weight_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<WeightRequest>,
) -> Result<Json<SessionView>> {
    state.update(&id, |s| s.set_edge_weight(req.weight)).await
}

#[derive(Deserialize)]
struct PushRequest {
    value: String,
}

async fn push_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PushRequest>,
) -> Result<Json<SessionView>> {
    state.update(&id, |s| s.push(&req.value)).await
}

async fn pop_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<SessionView>> {
    state.update(&id, Session::pop).await
}

async fn structure_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(edit): Json<StructureEdit>,
) -> Result<Json<SessionView>> {
    state.update(&id, |s| s.edit(edit)).await
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.session(&id).await {
        Ok(handle) => ws.on_upgrade(move |socket| handle_ws(socket, handle)),
        Err(e) => e.into_response(),
    }
}

async fn handle_ws(mut socket: WebSocket, handle: SessionHandle) {
    // Subscribe before taking the initial view
    let (mut views, initial) = {
        let session = handle.lock().await;
        (session.subscribe(), session.view())
    };
    if send(&mut socket, &WsResponse::View(initial)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            view = views.recv() => match view {
                Ok(view) => {
                    if send(&mut socket, &WsResponse::View(view)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("WebSocket client skipped {} views", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => {
                    // Parse command and respond
                    if let Ok(cmd) = serde_json::from_str::<WsCommand>(&text) {
                        let response = handle_ws_command(&handle, cmd).await;
                        if send(&mut socket, &response).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

async fn send(socket: &mut WebSocket, response: &WsResponse) -> std::result::Result<(), axum::Error> {
    match serde_json::to_string(response) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::warn!("Failed to encode view: {}", e);
            Ok(())
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum WsCommand {
    #[serde(rename = "get_view")]
    GetView,
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "pause")]
    Pause,
    #[serde(rename = "step")]
    Step,
    #[serde(rename = "reset")]
    Reset,
    #[serde(rename = "speed")]
    Speed { speed: u8 },
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum WsResponse {
    #[serde(rename = "view")]
    View(SessionView),
    #[serde(rename = "error")]
    Error { message: String },
}

async fn handle_ws_command(handle: &SessionHandle, cmd: WsCommand) -> WsResponse {
    let result = match cmd {
        WsCommand::Start => handle.start().await,
        cmd => {
            let mut session = handle.lock().await;
            let applied = match cmd {
                WsCommand::Pause => {
                    session.pause();
                    Ok(())
                }
                WsCommand::Step => session.step(),
                WsCommand::Reset => session.reset(),
                WsCommand::Speed { speed } => {
                    session.set_speed(speed);
                    Ok(())
                }
                WsCommand::GetView | WsCommand::Start => Ok(()),
            };
            applied.map(|()| session.view())
        }
    };
    match result {
        Ok(view) => WsResponse::View(view),
        Err(e) => WsResponse::Error { message: e.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn server() -> VisServer {
        VisServer::new(VisConfig {
            seed: Some(1),
            ..VisConfig::default()
        })
    }

    async fn post_json(path: &str, body: &str) -> (StatusCode, String) {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn malformed_input_json_is_bad_request() {
        let (status, body) = post_json("/api/vis/coin-change-problem/input", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn invalid_input_value_reports_error_body() {
        let (status, body) = post_json("/api/vis/coin-change-problem/input", r#"{"amount":"abc"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn structure_edits_route_to_session() {
        let (status, body) = post_json("/api/vis/python-dict/structure", r#"{"op":"delete","key":"zip"}"#).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("KeyError: 'zip' not found"));

        let (status, body) = post_json("/api/vis/python-list/structure", r#"{"op":"push","value":"7"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let view: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(view["message"], "list.append(7)");
        assert_eq!(view["presentation"]["type"], "sequence");
    }

    #[tokio::test]
    async fn topic_content_served() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/topics/merge-sort/content")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn sessions_created_once_per_topic() {
        let server = server();
        let a = server.state.session("bubble-sort").await.unwrap();
        a.lock().await.step().unwrap();

        let b = server.state.session("bubble-sort").await.unwrap();
        assert_eq!(b.lock().await.view().status.steps_applied, 1);
        assert_eq!(server.state.sessions.read().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_and_reading_topics_rejected() {
        let server = server();
        assert!(matches!(server.state.session("nope").await, Err(Error::NotFound(_))));
        assert!(matches!(
            server.state.session("kmp-algorithm").await,
            Err(Error::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn failed_update_leaves_session_untouched() {
        let server = server();
        let result = server
            .state
            .update("coin-change-problem", |s| {
                s.set_input(InputRequest {
                    amount: Some("-3".into()),
                    ..InputRequest::default()
                })
            })
            .await;
        assert!(matches!(result, Err(Error::Input(_))));

        let Json(view) = server.state.update("coin-change-problem", |_| Ok(())).await.unwrap();
        assert_eq!(view.inputs.amount, 11);
    }

    #[tokio::test]
    async fn ws_commands_drive_playback() {
        let server = server();
        let handle = server.state.session("linear-search").await.unwrap();

        match handle_ws_command(&handle, WsCommand::Step).await {
            WsResponse::View(view) => assert_eq!(view.status.steps_applied, 1),
            WsResponse::Error { message } => panic!("{message}"),
        }
        match handle_ws_command(&handle, WsCommand::Reset).await {
            WsResponse::View(view) => assert_eq!(view.status.steps_applied, 0),
            WsResponse::Error { message } => panic!("{message}"),
        }
    }

    #[tokio::test]
    async fn ws_errors_are_reported_inline() {
        let server = server();
        let handle = server.state.session("stacks").await.unwrap();
        assert!(matches!(
            handle_ws_command(&handle, WsCommand::Start).await,
            WsResponse::Error { .. }
        ));
    }
}
