use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Student {
    id: String,
    full_name: String,
    class_name: String,
    birth_date: String,
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct StudentList {
    visible: usize,
    students: Vec<Student>,
}

#[derive(Debug, Deserialize)]
struct Status {
    loading: bool,
    view: String,
    student_count: usize,
    endpoint_configured: bool,
}

#[derive(Debug, Deserialize)]
struct Summary {
    total: usize,
    class_count: usize,
    average: String,
}

#[derive(Debug, Deserialize)]
struct Insight {
    generating: bool,
    text: String,
}

#[derive(Debug, Deserialize)]
struct Analytics {
    summary: Summary,
    insight: Insight,
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

fn unique_settings_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("student_hub_http_{}_{}", std::process::id(), nanos));
    path.push("settings.json");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/status")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_student_hub"))
        .env("PORT", port.to_string())
        .env("APP_SETTINGS_PATH", unique_settings_path())
        .env("RUST_LOG", "info")
        .env_remove("API_KEY")
        .env_remove("GEMINI_API_KEY")
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

async fn list(client: &Client, base_url: &str, query: &str) -> StudentList {
    client
        .get(format!("{base_url}/api/students"))
        .query(&[("q", query)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn create(client: &Client, base_url: &str, name: &str, class: &str) -> Student {
    let response = client
        .post(format!("{base_url}/api/students"))
        .json(&serde_json::json!({
            "fullName": name,
            "className": class,
            "birthDate": "2009-06-15"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_unset_endpoint_starts_idle() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let status: Status = client
        .get(format!("{}/api/status", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(!status.endpoint_configured);
    assert!(!status.loading);

    let settings: serde_json::Value = client
        .get(format!("{}/api/settings", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(settings["google_script_url"], "");
}

#[tokio::test]
async fn http_create_student_prepends_and_shows_list() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = list(&client, &server.base_url, "").await;
    let created = create(&client, &server.base_url, "Phạm Minh Khoa", "12A1").await;

    assert!(!created.id.is_empty());
    assert_eq!(created.full_name, "Phạm Minh Khoa");
    assert_eq!(created.class_name, "12A1");
    assert_eq!(created.birth_date, "2009-06-15");
    assert!(created.created_at.ends_with('Z'));

    let after = list(&client, &server.base_url, "").await;
    assert_eq!(after.students.len(), before.students.len() + 1);
    assert_eq!(after.students[0].id, created.id);

    let status: Status = client
        .get(format!("{}/api/status", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status.view, "list");
    assert_eq!(status.student_count, after.students.len());

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Danh sách học sinh"));
    assert!(page.contains("Phạm Minh Khoa"));
}

#[tokio::test]
async fn http_incomplete_student_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = list(&client, &server.base_url, "").await;
    let response = client
        .post(format!("{}/api/students", server.base_url))
        .json(&serde_json::json!({ "fullName": "Chỉ có tên", "className": "", "birthDate": "2010-01-01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after = list(&client, &server.base_url, "").await;
    assert_eq!(after.students.len(), before.students.len());
}

#[tokio::test]
async fn http_search_matches_name_or_class() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let by_name = create(&client, &server.base_url, "Zebediah Quill", "7X").await;
    let by_class = create(&client, &server.base_url, "Ordinary Name", "ZEBEDIAH-CLASS").await;

    let found = list(&client, &server.base_url, "zebediah").await;
    let ids: Vec<_> = found.students.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(found.visible, 2);
    assert_eq!(ids, vec![by_class.id.as_str(), by_name.id.as_str()]);

    let none = list(&client, &server.base_url, "no-such-student-anywhere").await;
    assert_eq!(none.visible, 0);
}

#[tokio::test]
async fn http_delete_removes_only_that_student() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create(&client, &server.base_url, "Giữ Lại Một", "9A").await;
    let doomed = create(&client, &server.base_url, "Sẽ Bị Xóa", "9A").await;
    create(&client, &server.base_url, "Giữ Lại Hai", "9B").await;

    let before = list(&client, &server.base_url, "").await;
    let response = client
        .delete(format!("{}/api/students/{}", server.base_url, doomed.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let after = list(&client, &server.base_url, "").await;
    let expected: Vec<_> = before
        .students
        .iter()
        .filter(|s| s.id != doomed.id)
        .map(|s| s.id.clone())
        .collect();
    let actual: Vec<_> = after.students.iter().map(|s| s.id.clone()).collect();
    assert_eq!(actual, expected);

    let again = client
        .delete(format!("{}/api/students/{}", server.base_url, doomed.id))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_analytics_without_api_key_shows_error_text() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create(&client, &server.base_url, "Thống Kê", "10T").await;
    let total = list(&client, &server.base_url, "").await.students.len();

    let deadline = Instant::now() + Duration::from_secs(3);
    let analytics = loop {
        let analytics: Analytics = client
            .get(format!("{}/api/analytics", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if !analytics.insight.generating {
            break analytics;
        }
        if Instant::now() > deadline {
            panic!("insight never finished");
        }
        sleep(Duration::from_millis(50)).await;
    };

    assert_eq!(analytics.summary.total, total);
    assert!(analytics.summary.class_count >= 1);
    assert!(analytics.summary.average.contains('.'));
    assert_eq!(
        analytics.insight.text,
        "Có lỗi xảy ra khi kết nối với AI. Vui lòng thử lại sau."
    );
}

#[tokio::test]
async fn http_apps_script_template_is_plain_text() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/apps-script", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let content_type = response.headers()[reqwest::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
    let body = response.text().await.unwrap();
    assert!(body.contains("function doGet()"));
    assert!(body.contains("sheet.appendRow"));
}
