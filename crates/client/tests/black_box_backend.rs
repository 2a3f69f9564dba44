use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, Uri, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use cylinder_client::{AppSession, Console, HttpBackend, Identity, Role};
use cylinder_core::{CompanyId, ProductId, SerialNumber, TargetQuantity};
use cylinder_inventory::{BatchAction, ReceiveCylinders, SendForRefill};
use cylinder_receipt::{FileDocumentGenerator, ReceiptFormat};
use cylinder_scanning::ChannelDecodeSource;
use cylinder_workflows::{
    Backend, BackendError, EligibleQuery, NotificationLog, ScreenServices, WorkflowConfig,
    WorkflowScreen,
};

const TOKEN: &str = "worker-token";

#[derive(Default)]
struct FakeApi {
    hits: AtomicUsize,
    reject_submissions: AtomicBool,
    posted: Mutex<Vec<(String, Value)>>,
    queries: Mutex<Vec<HashMap<String, String>>>,
}

type Shared = Arc<FakeApi>;

fn authorized(api: &FakeApi, headers: &HeaderMap) -> bool {
    api.hits.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {TOKEN}");
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(expected.as_str())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "invalid token").into_response()
}

async fn companies(State(api): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&api, &headers) {
        return unauthorized();
    }
    Json(json!([{ "id": 1, "name": "Acme Gases" }, { "id": 2, "name": "Beta Welding" }])).into_response()
}

async fn products(State(api): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&api, &headers) {
        return unauthorized();
    }
    Json(json!([{ "id": 7, "name": "Oxygen 47L" }])).into_response()
}

async fn available(
    State(api): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&api, &headers) {
        return unauthorized();
    }
    let quantity: usize = params.get("quantity").and_then(|q| q.parse().ok()).unwrap_or(0);
    api.queries.lock().unwrap().push(params);
    let records: Vec<Value> = (1..=quantity)
        .map(|i| json!({ "serial_number": format!("A{i}"), "status": "available" }))
        .collect();
    Json(Value::Array(records)).into_response()
}

async fn dispatched(
    State(api): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&api, &headers) {
        return unauthorized();
    }
    api.queries.lock().unwrap().push(params);
    Json(json!([{ "serial_number": "C1" }, { "serial_number": "C2" }])).into_response()
}

async fn empty_grouped(State(api): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&api, &headers) {
        return unauthorized();
    }
    Json(json!([
        { "gas_type": "Oxygen", "size": 47, "cylinders": [{ "serial_number": "E1" }, { "serial_number": "E2" }] },
        { "gas_type": "Nitrogen", "size": "10", "cylinders": [{ "serial_number": "E3" }] },
    ]))
    .into_response()
}

async fn refilling(State(api): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&api, &headers) {
        return unauthorized();
    }
    // Not a list: the client must report a parse error.
    Json(json!({ "cylinders": "soon" })).into_response()
}

async fn record(State(api): State<Shared>, headers: HeaderMap, uri: Uri, Json(body): Json<Value>) -> Response {
    if !authorized(&api, &headers) {
        return unauthorized();
    }
    if api.reject_submissions.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    api.posted.lock().unwrap().push((uri.path().to_string(), body));
    Json(json!({ "message": "ok" })).into_response()
}

struct TestServer {
    base_url: String,
    api: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let api: Shared = Arc::new(FakeApi::default());
        let app = Router::new()
            .route("/companies", get(companies))
            .route("/products", get(products))
            .route("/available-cylinders", get(available))
            .route("/dispatched-cylinders", get(dispatched))
            .route("/empty-cylinders-grouped", get(empty_grouped))
            .route("/refilling-cylinders", get(refilling))
            .route("/dispatch-cylinder", post(record))
            .route("/receive-cylinder", post(record))
            .route("/refill-cylinder", post(record))
            .route("/complete-refill", post(record))
            .with_state(api.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            api,
            handle,
        }
    }

    fn backend(&self, token: Option<&str>) -> HttpBackend {
        let session = AppSession::new();
        if let Some(token) = token {
            session.sign_in(Identity {
                token: token.to_string(),
                username: "sam".to_string(),
                role: Role::Worker,
            });
        }
        HttpBackend::new(format!("{}/", self.base_url), session)
    }

    fn posted(&self) -> Vec<(String, Value)> {
        self.api.posted.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn sn(s: &str) -> SerialNumber {
    SerialNumber::parse(s).unwrap()
}

#[tokio::test]
async fn reference_lists_are_fetched_with_bearer_token() {
    let server = TestServer::spawn().await;
    let backend = server.backend(Some(TOKEN));

    let companies = backend.list_companies().await.unwrap();
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0].id, CompanyId::numeric(1));
    assert_eq!(companies[1].name, "Beta Welding");

    let products = backend.list_products().await.unwrap();
    assert_eq!(products[0].id, ProductId::numeric(7));
}

#[tokio::test]
async fn signed_out_session_never_reaches_the_server() {
    let server = TestServer::spawn().await;
    let backend = server.backend(None);

    assert_eq!(backend.list_companies().await, Err(BackendError::Unauthenticated));
    let action = BatchAction::SendForRefill(SendForRefill {
        cylinder_ids: vec![sn("E1")],
    });
    assert_eq!(backend.submit(&action).await, Err(BackendError::Unauthenticated));
    assert_eq!(server.api.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_token_maps_to_status_error() {
    let server = TestServer::spawn().await;
    let backend = server.backend(Some("stale"));

    assert_eq!(
        backend.list_products().await,
        Err(BackendError::Status(401, "invalid token".to_string()))
    );
}

#[tokio::test]
async fn eligible_queries_hit_their_endpoints() {
    let server = TestServer::spawn().await;
    let backend = server.backend(Some(TOKEN));

    let available = backend
        .list_cylinders(&EligibleQuery::Available {
            product: ProductId::numeric(7),
            quantity: TargetQuantity::new(3).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(available.len(), 3);
    assert_eq!(available[0].status.as_deref(), Some("available"));

    let dispatched = backend
        .list_cylinders(&EligibleQuery::Dispatched {
            company: CompanyId::numeric(2),
        })
        .await
        .unwrap();
    assert_eq!(dispatched.len(), 2);

    let queries = server.api.queries.lock().unwrap().clone();
    assert_eq!(queries[0].get("product").map(String::as_str), Some("7"));
    assert_eq!(queries[0].get("quantity").map(String::as_str), Some("3"));
    assert_eq!(queries[1].get("companyId").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn grouped_empties_are_flattened_with_gas_type() {
    let server = TestServer::spawn().await;
    let backend = server.backend(Some(TOKEN));

    let empties = backend.list_cylinders(&EligibleQuery::Empty).await.unwrap();

    let serials: Vec<&str> = empties.iter().map(|r| r.serial_number.as_str()).collect();
    assert_eq!(serials, vec!["E1", "E2", "E3"]);
    assert_eq!(empties[2].gas_type.as_deref(), Some("Nitrogen"));
}

#[tokio::test]
async fn unexpected_body_is_a_parse_error() {
    let server = TestServer::spawn().await;
    let backend = server.backend(Some(TOKEN));

    assert!(matches!(
        backend.list_cylinders(&EligibleQuery::Refilling).await,
        Err(BackendError::Parse(_))
    ));
}

#[tokio::test]
async fn submit_posts_camel_case_body() {
    let server = TestServer::spawn().await;
    let backend = server.backend(Some(TOKEN));

    let action = BatchAction::Receive(ReceiveCylinders {
        empty_serial_numbers: vec![sn("C2")],
        filled_serial_numbers: vec![sn("C1")],
        company_id: CompanyId::numeric(1),
    });
    backend.submit(&action).await.unwrap();

    assert_eq!(
        server.posted(),
        vec![(
            "/receive-cylinder".to_string(),
            json!({ "emptySerialNumbers": ["C2"], "filledSerialNumbers": ["C1"], "companyId": 1 })
        )]
    );
}

#[tokio::test]
async fn server_failure_carries_status_and_body() {
    let server = TestServer::spawn().await;
    server.api.reject_submissions.store(true, Ordering::SeqCst);
    let backend = server.backend(Some(TOKEN));

    let action = BatchAction::SendForRefill(SendForRefill {
        cylinder_ids: vec![sn("E1")],
    });
    assert_eq!(
        backend.submit(&action).await,
        Err(BackendError::Status(500, "database unavailable".to_string()))
    );
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let session = AppSession::new();
    session.sign_in(Identity {
        token: TOKEN.to_string(),
        username: "sam".to_string(),
        role: Role::Worker,
    });
    let backend = HttpBackend::new(format!("http://{addr}"), session);

    assert!(matches!(backend.list_companies().await, Err(BackendError::Network(_))));
}

#[tokio::test]
async fn console_dispatches_scanned_cylinders_and_saves_receipt() {
    let server = TestServer::spawn().await;
    let receipts = tempfile::tempdir().unwrap();

    let notes = Arc::new(NotificationLog::new());
    let services = ScreenServices {
        backend: Arc::new(server.backend(Some(TOKEN))),
        documents: Arc::new(FileDocumentGenerator::new(receipts.path(), ReceiptFormat::Csv)),
        notifier: notes.clone(),
    };
    let (source, scanner) = ChannelDecodeSource::new();
    let screen = WorkflowScreen::new(WorkflowConfig::dispatch(), services, source);
    let mut console = Console::new(screen, scanner, notes);

    let intro = console.start().await;
    assert!(intro.iter().any(|line| line.contains("Acme Gases")));

    for line in ["company 1", "product 7", "qty 2", "scan", "A1", "y", "A1"] {
        console.handle(line).await;
    }
    let duplicate = console.handle("A2").await;
    assert!(duplicate.lines[0].starts_with("read A2"), "{:?}", duplicate.lines);

    let complete = console.handle("y").await;
    assert!(complete.lines[0].contains("scan complete"), "{:?}", complete.lines);
    console.handle("done").await;
    assert!(!console.is_scanning());

    let submitted = console.handle("submit").await;
    assert!(
        submitted.lines.iter().any(|l| l == "[ok] Cylinders Dispatched Successfully!"),
        "{:?}",
        submitted.lines
    );

    let posted = server.posted();
    assert_eq!(posted.len(), 1);
    let (endpoint, body) = &posted[0];
    assert_eq!(endpoint, "/dispatch-cylinder");
    assert_eq!(body["serialNumbers"], json!(["A1", "A2"]));
    assert_eq!(body["selectedCompany"], json!("Acme Gases"));
    assert_eq!(body["companyId"], json!(1));
    assert_eq!(body["quantity"], json!(2));

    let txn = body["transactionId"].as_str().unwrap();
    let receipt = receipts.path().join(format!("Dispatch_Receipt_{txn}.csv"));
    let contents = std::fs::read_to_string(receipt).unwrap();
    assert!(contents.starts_with("Cylinder Dispatch Receipt\n"));
    assert!(contents.contains("2,A2"));

    let quit = console.handle("quit").await;
    assert!(quit.quit);
}
