//! Axum web server with WebSocket streaming for the ring explainer.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use arcring_ring::{NodeId, RingPosition};

use crate::error::{Error, Result};
use crate::events::RingSnapshot;
use crate::playback::{Playback, PlaybackSpeed, PlaybackState, PlaybackStatus};
use crate::simulation::Simulation;

/// Shared application state.
///
/// Lock order is always `simulation` before `playback`.
pub struct AppState {
    simulation: RwLock<Simulation>,
    playback: RwLock<Playback>,
    frame_interval: Duration,
}

/// Explainer server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server around a simulation.
    pub fn new(simulation: Simulation) -> Self {
        let events = simulation.events().to_vec();
        let frame_interval = Duration::from_millis(simulation.config().base_frame_ms);
        Self {
            state: Arc::new(AppState {
                simulation: RwLock::new(simulation),
                playback: RwLock::new(Playback::new(events)),
                frame_interval,
            }),
        }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            // Ring operations
            .route("/api/status", get(status_handler))
            .route("/api/snapshot", get(snapshot_handler))
            .route("/api/timeline", get(timeline_handler))
            .route("/api/nodes", post(add_node_handler))
            .route("/api/keys", post(add_key_handler))
            .route("/api/reset", post(reset_handler))
            .route("/api/lookup", get(lookup_handler))
            // Timeline playback
            .route("/api/playback", get(playback_status_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/stop", post(stop_handler))
            .route("/api/playback/seek", post(seek_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/api/playback/step", post(step_handler))
            .route("/ws", get(ws_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given port.
    pub async fn serve(self, port: u16) -> Result<()> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tokio::spawn(run_ticker(self.state.clone()));
        tracing::info!("Ring explainer running on http://localhost:{}", port);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Advance playback while it is playing.
async fn run_ticker(state: Arc<AppState>) {
    let base = state.frame_interval;
    loop {
        let interval = {
            let mut playback = state.playback.write().await;
            if playback.state() == PlaybackState::Playing {
                playback.step_forward();
            }
            playback.speed().frame_interval(base).unwrap_or(base)
        };
        tokio::time::sleep(interval.max(Duration::from_millis(10))).await;
    }
}

/// A mutation requested from the frontend.
#[derive(Debug, Clone, Copy)]
enum RingAction {
    AddNode,
    AddKey,
    Reset,
}

/// Apply a mutation, refresh the playback timeline and return the live ring.
async fn apply(state: &AppState, action: RingAction) -> Result<RingSnapshot> {
    let mut sim = state.simulation.write().await;
    match action {
        RingAction::AddNode => {
            sim.add_node();
        }
        RingAction::AddKey => {
            sim.add_key()?;
        }
        RingAction::Reset => sim.reset(),
    }

    let mut playback = state.playback.write().await;
    playback.replace_events(sim.events().to_vec());
    Ok(sim.snapshot())
}

async fn timeline_snapshot(state: &AppState) -> RingSnapshot {
    let sim = state.simulation.read().await;
    let playback = state.playback.read().await;
    RingSnapshot::from_events(sim.events(), playback.current_frame())
}

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    node_count: usize,
    key_count: usize,
    event_count: usize,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let sim = state.simulation.read().await;
    Json(StatusResponse {
        status: "ok",
        node_count: sim.node_count(),
        key_count: sim.key_count(),
        event_count: sim.event_count(),
    })
}

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<RingSnapshot> {
    Json(state.simulation.read().await.snapshot())
}

async fn timeline_handler(State(state): State<Arc<AppState>>) -> Json<RingSnapshot> {
    Json(timeline_snapshot(&state).await)
}

async fn add_node_handler(State(state): State<Arc<AppState>>) -> Result<Json<RingSnapshot>> {
    apply(&state, RingAction::AddNode).await.map(Json)
}

async fn add_key_handler(State(state): State<Arc<AppState>>) -> Result<Json<RingSnapshot>> {
    apply(&state, RingAction::AddKey).await.map(Json)
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<RingSnapshot>> {
    apply(&state, RingAction::Reset).await.map(Json)
}

#[derive(Deserialize)]
struct LookupQuery {
    position: Option<u32>,
    name: Option<String>,
}

#[derive(Serialize)]
struct LookupResponse {
    position: RingPosition,
    owner: NodeId,
    /// Whether the position came from hashing a name
    hashed: bool,
}

async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResponse>> {
    let (position, hashed) = match (query.position, query.name) {
        (Some(degrees), None) => (RingPosition::new(degrees)?, false),
        (None, Some(name)) => (RingPosition::from_bytes(name.as_bytes()), true),
        _ => {
            return Err(Error::InvalidInput(
                "expected exactly one of `position` or `name`".into(),
            ))
        }
    };

    let owner = state.simulation.read().await.lookup(position)?;
    Ok(Json(LookupResponse {
        position,
        owner,
        hashed,
    }))
}

async fn playback_status_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    let playback = state.playback.read().await;
    Json(PlaybackStatus::from(&*playback))
}

async fn play_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.play();
    Json(PlaybackStatus::from(&*playback))
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.pause();
    Json(PlaybackStatus::from(&*playback))
}

async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.stop();
    Json(PlaybackStatus::from(&*playback))
}

#[derive(Deserialize)]
struct SeekRequest {
    frame: usize,
}

async fn seek_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekRequest>,
) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.seek(req.frame);
    Json(PlaybackStatus::from(&*playback))
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed: PlaybackSpeed,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.set_speed(req.speed);
    Json(PlaybackStatus::from(&*playback))
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum StepDirection {
    Forward,
    Backward,
}

#[derive(Deserialize)]
struct StepRequest {
    direction: StepDirection,
}

async fn step_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepRequest>,
) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    match req.direction {
        StepDirection::Forward => {
            playback.step_forward();
        }
        StepDirection::Backward => playback.step_backward(),
    }
    Json(PlaybackStatus::from(&*playback))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let initial = WsResponse::Snapshot(state.simulation.read().await.snapshot());
    if send_json(&mut socket, &initial).await.is_err() {
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let response = match serde_json::from_str::<WsCommand>(text.as_str()) {
                    Ok(cmd) => handle_ws_command(&state, cmd).await,
                    Err(e) => WsResponse::Error {
                        message: format!("unrecognised command: {}", e),
                    },
                };
                if send_json(&mut socket, &response).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    tracing::debug!("websocket closed");
}

async fn send_json(socket: &mut WebSocket, response: &WsResponse) -> Result<()> {
    let json = serde_json::to_string(response)?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetSnapshot,
    GetTimeline,
    GetStatus,
    AddNode,
    AddKey,
    Reset,
    Seek { frame: usize },
    Play,
    Pause,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Snapshot(RingSnapshot),
    Status(PlaybackStatus),
    Error { message: String },
}

impl From<Result<RingSnapshot>> for WsResponse {
    fn from(result: Result<RingSnapshot>) -> Self {
        match result {
            Ok(snapshot) => WsResponse::Snapshot(snapshot),
            Err(e) => WsResponse::Error {
                message: e.to_string(),
            },
        }
    }
}

async fn handle_ws_command(state: &AppState, cmd: WsCommand) -> WsResponse {
    match cmd {
        WsCommand::GetSnapshot => WsResponse::Snapshot(state.simulation.read().await.snapshot()),
        WsCommand::GetTimeline => WsResponse::Snapshot(timeline_snapshot(state).await),
        WsCommand::GetStatus => {
            let playback = state.playback.read().await;
            WsResponse::Status(PlaybackStatus::from(&*playback))
        }
        WsCommand::AddNode => apply(state, RingAction::AddNode).await.into(),
        WsCommand::AddKey => apply(state, RingAction::AddKey).await.into(),
        WsCommand::Reset => apply(state, RingAction::Reset).await.into(),
        WsCommand::Seek { frame } => {
            let mut playback = state.playback.write().await;
            playback.seek(frame);
            WsResponse::Status(PlaybackStatus::from(&*playback))
        }
        WsCommand::Play => {
            let mut playback = state.playback.write().await;
            playback.play();
            WsResponse::Status(PlaybackStatus::from(&*playback))
        }
        WsCommand::Pause => {
            let mut playback = state.playback.write().await;
            playback.pause();
            WsResponse::Status(PlaybackStatus::from(&*playback))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_server() -> VisServer {
        VisServer::new(Simulation::new(SimulationConfig::default()))
    }

    async fn call(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn status_reports_initial_ring() {
        let server = test_server();
        let (status, body) = call(server.router(), "GET", "/api/status", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["node_count"], 3);
        assert_eq!(body["key_count"], 0);
    }

    #[tokio::test]
    async fn add_node_and_key_return_snapshot() {
        let server = test_server();

        let (status, body) = call(server.router(), "POST", "/api/nodes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["node_count"], 4);

        let (status, body) = call(server.router(), "POST", "/api/keys", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["key_count"], 1);
        assert!(body["keys"][0]["owner"].is_string());
    }

    #[tokio::test]
    async fn lookup_by_position_uses_initial_topology() {
        let server = test_server();

        let (status, body) = call(server.router(), "GET", "/api/lookup?position=50", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["owner"], "B");
        assert_eq!(body["hashed"], false);

        let (_, body) = call(server.router(), "GET", "/api/lookup?position=241", None).await;
        assert_eq!(body["owner"], "A");
    }

    #[tokio::test]
    async fn lookup_by_name_hashes() {
        let server = test_server();
        let (status, body) = call(server.router(), "GET", "/api/lookup?name=user42", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hashed"], true);
        assert_eq!(
            body["position"],
            RingPosition::from_bytes(b"user42").degrees()
        );
    }

    #[tokio::test]
    async fn lookup_rejects_bad_queries() {
        let server = test_server();

        let (status, _) = call(server.router(), "GET", "/api/lookup?position=360", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(server.router(), "GET", "/api/lookup", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("position"));
    }

    #[tokio::test]
    async fn reset_restores_initial_ring() {
        let server = test_server();
        call(server.router(), "POST", "/api/nodes", None).await;
        call(server.router(), "POST", "/api/keys", None).await;

        let (_, body) = call(server.router(), "POST", "/api/reset", None).await;
        assert_eq!(body["node_count"], 3);
        assert_eq!(body["key_count"], 0);
        let labels: Vec<_> = body["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(labels, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn timeline_follows_seek() {
        let server = test_server();
        call(server.router(), "POST", "/api/keys", None).await;

        // Frame 2 has the reset marker and node A only.
        let (status, playback) =
            call(server.router(), "POST", "/api/playback/seek", Some(serde_json::json!({ "frame": 2 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(playback["current_frame"], 2);

        let (_, snap) = call(server.router(), "GET", "/api/timeline", None).await;
        assert_eq!(snap["node_count"], 1);
        assert_eq!(snap["key_count"], 0);
    }

    #[tokio::test]
    async fn step_and_speed_controls() {
        let server = test_server();

        let (_, status) = call(
            server.router(),
            "POST",
            "/api/playback/step",
            Some(serde_json::json!({ "direction": "backward" })),
        )
        .await;
        assert_eq!(status["current_frame"], 3);
        assert_eq!(status["state"], "paused");

        let (_, status) = call(
            server.router(),
            "POST",
            "/api/playback/speed",
            Some(serde_json::json!({ "speed": "double" })),
        )
        .await;
        assert_eq!(status["speed"], "double");
    }

    #[tokio::test]
    async fn ws_commands_apply_mutations() {
        let server = test_server();
        let state = server.state.clone();

        let cmd: WsCommand = serde_json::from_str(r#"{"type":"add_node"}"#).unwrap();
        let response = serde_json::to_value(handle_ws_command(&state, cmd).await).unwrap();
        assert_eq!(response["type"], "snapshot");
        assert_eq!(response["node_count"], 4);

        let cmd: WsCommand = serde_json::from_str(r#"{"type":"seek","frame":0}"#).unwrap();
        let response = serde_json::to_value(handle_ws_command(&state, cmd).await).unwrap();
        assert_eq!(response["type"], "status");
        assert_eq!(response["current_frame"], 0);
    }

    #[test]
    fn ws_rejects_unknown_commands() {
        assert!(serde_json::from_str::<WsCommand>(r#"{"type":"remove_node"}"#).is_err());
    }
}
