use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

// sha256("secret")
const PASSWORD_HASH: &str = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b";

#[derive(Debug, Deserialize)]
struct SessionResponse {
    authenticated: bool,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    removed: usize,
    remaining: usize,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("planos_http_{}_{}.csv", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/public/totals")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_planos"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("PASSWORD_HASH", PASSWORD_HASH)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

fn cookie_client() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

async fn admin_client(base_url: &str) -> Client {
    let client = cookie_client();
    let response = client
        .post(format!("{base_url}/api/login"))
        .json(&json!({ "password": "secret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    client
}

async fn admin_records(client: &Client, base_url: &str) -> Vec<Value> {
    client
        .get(format!("{base_url}/api/admin/records"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_admin_routes_require_login() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = cookie_client();

    let list = client
        .get(format!("{}/api/admin/records", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(list.status(), StatusCode::UNAUTHORIZED);

    let create = client
        .post(format!("{}/api/admin/records", server.base_url))
        .json(&json!({
            "periodicity": "Diaria",
            "plan_type": "Robo",
            "units_made": 1,
            "unit_price": 10,
            "unit_cost": 5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_wrong_password_keeps_session_public() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = cookie_client();

    let response = client
        .post(format!("{}/api/login", server.base_url))
        .json(&json!({ "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.text().await.unwrap(), "incorrect password");

    let session: SessionResponse = client
        .get(format!("{}/api/session", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!session.authenticated);
}

#[tokio::test]
async fn http_admin_adds_validates_and_deletes_records() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = admin_client(&server.base_url).await;
    let before = admin_records(&client, &server.base_url).await.len();

    let created = client
        .post(format!("{}/api/admin/records", server.base_url))
        .json(&json!({
            "date": "2024-06-05",
            "periodicity": "Semanal",
            "plan_type": "Arquitectonico",
            "units_made": 3,
            "unit_price": 200,
            "unit_cost": 50
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = created.json().await.unwrap();
    assert_eq!(created["record"]["date"], "2024-06-03");
    assert_eq!(created["record"]["week_bucket"], "2024-06-03");
    assert_eq!(created["record"]["total_cost"], 150.0);
    assert_eq!(created["record"]["net_profit"], 450.0);
    assert_eq!(created["warnings"], json!([]));

    let rejected = client
        .post(format!("{}/api/admin/records", server.base_url))
        .json(&json!({
            "periodicity": "Diaria",
            "plan_type": "Robo",
            "units_made": 0,
            "unit_price": 200,
            "unit_cost": 50
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let pricey: Value = client
        .post(format!("{}/api/admin/records", server.base_url))
        .json(&json!({
            "date": "2024-06-06",
            "periodicity": "Diaria",
            "plan_type": "Otro",
            "units_made": 2,
            "unit_price": 100,
            "unit_cost": 150
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pricey["warnings"], json!(["cost is higher than sale price"]));
    assert_eq!(pricey["record"]["week_bucket"], Value::Null);

    let rows = admin_records(&client, &server.base_url).await;
    assert_eq!(rows.len(), before + 2);

    let empty = client
        .post(format!("{}/api/admin/records/delete", server.base_url))
        .json(&json!({ "indices": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    assert_eq!(empty.text().await.unwrap(), "nothing selected");

    let deleted: DeleteResponse = client
        .post(format!("{}/api/admin/records/delete", server.base_url))
        .json(&json!({ "indices": [before, before + 1, 9999] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted.removed, 2);
    assert_eq!(deleted.remaining, before);
}

#[tokio::test]
async fn http_public_views_aggregate_weekly_production() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = admin_client(&server.base_url).await;

    for (date, units) in [("2024-06-03", 3), ("2024-06-04", 5)] {
        let response = client
            .post(format!("{}/api/admin/records", server.base_url))
            .json(&json!({
                "date": date,
                "periodicity": "Semanal",
                "plan_type": "Catastral",
                "units_made": units,
                "unit_price": 10,
                "unit_cost": 1
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let public = Client::new();
    let series: Value = public
        .get(format!("{}/api/public/series?types=Catastral", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        series,
        json!([{
            "plan_type": "Catastral",
            "points": [{ "bucket": "2024-06-03", "value": 8.0 }]
        }])
    );

    let response = client
        .post(format!("{}/api/admin/records", server.base_url))
        .json(&json!({
            "date": "2024-06-04",
            "periodicity": "Diaria",
            "plan_type": "Plano, grande",
            "units_made": 2,
            "unit_price": 10,
            "unit_cost": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let picked: Vec<Value> = public
        .get(format!("{}/api/public/series", server.base_url))
        .query(&[("types", "Catastral"), ("types", "Plano, grande")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let labels: Vec<&str> = picked
        .iter()
        .map(|series| series["plan_type"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Catastral", "Plano, grande"]);

    let totals: Vec<Value> = public
        .get(format!("{}/api/public/totals", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(totals
        .iter()
        .any(|row| row["plan_type"] == "Catastral" && row["units_made"] == 8));

    let rows: Vec<Value> = public
        .get(format!("{}/api/public/records", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|row| row.get("unit_price").is_none()
        && row.get("net_profit").is_none()));

    let metrics: Value = client
        .get(format!(
            "{}/api/admin/metrics?from=2024-06-03&to=2024-06-04",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(metrics["metrics"]["total_units"].as_u64().unwrap() >= 8);
}
