use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioExecutor;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// In-memory stand-in for the query gateway. It understands just enough of
/// the three statements the processor issues to emulate the `space` table,
/// and records every statement it sees so tests can assert call order.
pub struct MockGateway {
    port: u16,
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    // (lot_id, space_id) -> status
    rows: HashMap<(String, String), i64>,
    queries: Vec<(String, Vec<Value>)>,
    fail_with: Option<u16>,
}

impl MockGateway {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();
        let state: Arc<Mutex<MockState>> = Arc::default();

        let accept_state = state.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = hyper_util::rt::TokioIo::new(stream);
                let state = accept_state.clone();

                tokio::spawn(async move {
                    let handler = service_fn(move |req: Request<Incoming>| {
                        let state = state.clone();
                        async move {
                            let body = req
                                .into_body()
                                .collect()
                                .await
                                .map(|collected| collected.to_bytes())
                                .unwrap_or_else(|_| Bytes::new());
                            let request: Value =
                                serde_json::from_slice(&body).unwrap_or(json!(null));

                            let (status, payload) = handle_query(&state, &request);
                            let response = Response::builder()
                                .status(status)
                                .header("content-type", "application/json")
                                .body(Full::new(Bytes::from(payload.to_string())))
                                .unwrap();
                            Ok::<_, Infallible>(response)
                        }
                    });

                    if let Err(err) =
                        hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                            .serve_connection(io, handler)
                            .await
                    {
                        eprintln!("Error serving connection: {:?}", err);
                    }
                });
            }
        });

        MockGateway { port, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// All recorded statements with their parameters, in arrival order.
    pub fn queries(&self) -> Vec<(String, Vec<Value>)> {
        self.state.lock().unwrap().queries.clone()
    }

    /// Leading keyword of each recorded statement, in arrival order.
    pub fn statements(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .queries
            .iter()
            .map(|(sql, _)| {
                sql.split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }

    pub fn row_status(&self, lot_id: &str, space_id: &str) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .rows
            .get(&(lot_id.to_string(), space_id.to_string()))
            .copied()
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }

    pub fn seed_row(&self, lot_id: &str, space_id: &str, status: i64) {
        self.state
            .lock()
            .unwrap()
            .rows
            .insert((lot_id.to_string(), space_id.to_string()), status);
    }

    /// Make every subsequent query answer with the given status code.
    pub fn fail_with(&self, status: u16) {
        self.state.lock().unwrap().fail_with = Some(status);
    }
}

fn param_str(params: &[Value], index: usize) -> String {
    params
        .get(index)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn handle_query(state: &Mutex<MockState>, request: &Value) -> (u16, Value) {
    let mut state = state.lock().unwrap();

    let sql = request["query"].as_str().unwrap_or_default().to_string();
    let params: Vec<Value> = request["params"].as_array().cloned().unwrap_or_default();
    state.queries.push((sql.clone(), params.clone()));

    if let Some(status) = state.fail_with {
        return (status, json!({"error": "injected failure"}));
    }

    if sql.starts_with("SELECT") {
        let key = (param_str(&params, 0), param_str(&params, 1));
        let results = if state.rows.contains_key(&key) {
            json!([{"1": 1}])
        } else {
            json!([])
        };
        (200, json!({"success": true, "results": results}))
    } else if sql.starts_with("INSERT") {
        // VALUES order is (id, lot_id, category, status)
        let key = (param_str(&params, 1), param_str(&params, 0));
        let status = params.get(3).and_then(|v| v.as_i64()).unwrap_or_default();
        state.rows.insert(key, status);
        (200, json!({"success": true, "meta": {"changes": 1}}))
    } else if sql.starts_with("UPDATE") {
        let key = (param_str(&params, 0), param_str(&params, 1));
        let changes = match state.rows.get_mut(&key) {
            Some(status) => {
                *status = 1;
                1
            }
            None => 0,
        };
        (200, json!({"success": true, "meta": {"changes": changes}}))
    } else {
        (400, json!({"error": "unrecognized statement"}))
    }
}
