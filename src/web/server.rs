//! HTTP server for the card viewer.
//!
//! Serves the app page, the card payload the page fetches, and a CSV view of
//! each spreadsheet (the link handed to the client).

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use super::templates::{render_index, CARDS_ENDPOINT};
use crate::cards::{CardStoreError, CardsPayload, LocalCardStore};
use crate::config::AppConfig;
use crate::sheets::{SheetError, SpreadsheetStore};

/// Server state shared across requests.
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<AppConfig>,
    /// Requests touching storage take this lock one at a time.
    pub store: Arc<Mutex<LocalCardStore>>,
}

impl ServerState {
    pub fn new(store: LocalCardStore) -> Self {
        Self {
            config: Arc::new(store.config().clone()),
            store: Arc::new(Mutex::new(store)),
        }
    }
}

/// Error returned to HTTP clients as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<SheetError> for ApiError {
    fn from(err: SheetError) -> Self {
        let status = if err.is_missing() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<CardStoreError> for ApiError {
    fn from(err: CardStoreError) -> Self {
        match err {
            CardStoreError::Sheet(e) => e.into(),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::error!("Request failed: {}", self.message);
        }
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Run `f` against the card store on the blocking pool.
async fn with_store<T, F>(state: &ServerState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&LocalCardStore) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || {
        let store = store
            .lock()
            .map_err(|_| ApiError::internal("Card store lock poisoned"))?;
        f(&store)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Card store task failed: {}", e)))?
}

/// The app page.
async fn index(State(state): State<ServerState>) -> Result<Html<String>, ApiError> {
    let page = render_index(&state.config).map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Html(page.to_document()))
}

/// Cards, chapter index and spreadsheet link for the client.
async fn get_cards(State(state): State<ServerState>) -> Result<Json<CardsPayload>, ApiError> {
    let payload = with_store(&state, |store| Ok(store.get_cards()?)).await?;
    Ok(Json(payload))
}

/// Primary sheet of a spreadsheet as CSV.
async fn spreadsheet_csv(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let (name, body) = with_store(&state, move |store| {
        let spreadsheet = store.sheets().open_by_id(&id)?;
        let rows = store.sheets().read_rows(&spreadsheet)?;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        for row in &rows {
            writer.write_record(row)?;
        }
        let body = writer
            .into_inner()
            .map_err(|e| ApiError::internal(e.to_string()))?;
        Ok((spreadsheet.name, body))
    })
    .await?;

    let disposition = format!(
        "inline; filename=\"{}.csv\"",
        name.replace(['"', '\\'], "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Build the application router.
pub fn router(state: ServerState) -> Router {
    let api = Router::new().route(CARDS_ENDPOINT, get(get_cards)).layer(
        CorsLayer::new()
            .allow_methods([Method::GET])
            .allow_origin(Any),
    );

    Router::new()
        .route("/", get(index))
        .route("/spreadsheets/{id}", get(spreadsheet_csv))
        .merge(api)
        .with_state(state)
}

/// Server handle for managing the server lifecycle.
pub struct FlashcardServer {
    /// Address the server is listening on.
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl FlashcardServer {
    /// Get the base URL for this server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the server and wait for in-flight requests to finish.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Start serving on the configured listen address.
pub async fn start_server(
    store: LocalCardStore,
) -> Result<FlashcardServer, Box<dyn std::error::Error + Send + Sync>> {
    let listen = store.config().listen;
    let app = router(ServerState::new(store));

    let listener = TcpListener::bind(listen).await?;
    let addr = listener.local_addr()?;

    log::info!("Flash cards server started on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                log::info!("Flash cards server shutting down");
            })
            .await;
        if let Err(e) = result {
            log::error!("Flash cards server error: {}", e);
        }
    });

    Ok(FlashcardServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardStore};
    use crate::properties::UserProperties;
    use crate::sheets::CsvSpreadsheetStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn create_test_state() -> (ServerState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let sheets = CsvSpreadsheetStore::new(temp_dir.path(), "http://localhost:8080").unwrap();
        let properties = UserProperties::open(temp_dir.path(), "default").unwrap();
        let store = CardStore::new(AppConfig::default(), sheets, properties);
        (ServerState::new(store), temp_dir)
    }

    async fn get(state: &ServerState, uri: &str) -> (StatusCode, String) {
        let response = router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_index_page() {
        let (state, _temp) = create_test_state();
        let (status, body) = get(&state, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<!DOCTYPE html>"));
        assert!(body.contains("<title>flash cards</title>"));
        assert!(body.contains("name=\"viewport\""));
    }

    #[tokio::test]
    async fn test_cards_endpoint_serves_default_card() {
        let (state, _temp) = create_test_state();
        let (status, body) = get(&state, "/api/cards").await;

        assert_eq!(status, StatusCode::OK);
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(payload["cards"].as_array().unwrap().len(), 1);
        assert_eq!(payload["cards"][0]["chapter"], "1");
        assert_eq!(payload["chapters"], serde_json::json!({"1": {"1": true}}));
        assert!(payload["url"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost:8080/spreadsheets/"));
    }

    #[tokio::test]
    async fn test_spreadsheet_csv() {
        let (state, _temp) = create_test_state();
        let id = {
            let store = state.store.lock().unwrap();
            let sheet = store.add_card(&Card::new("2", "1", "Front, text", "Back")).unwrap();
            sheet.id
        };

        let (status, body) = get(&state, &format!("/spreadsheets/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Chapter,Section,Front,Back\n2,1,\"Front, text\",Back\n");
    }

    #[tokio::test]
    async fn test_unknown_spreadsheet_is_404() {
        let (state, _temp) = create_test_state();

        let (status, body) = get(&state, &format!("/spreadsheets/{}", uuid::Uuid::new_v4())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("\"error\""));

        let (status, _) = get(&state, "/spreadsheets/not-an-id").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
