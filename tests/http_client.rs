//! Tests of the HTTP client, against a throwaway server that answers a single canned response

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use taskgrid::client::Client;
use taskgrid::error::ApiError;
use taskgrid::traits::TaskSource;
use taskgrid::task::TaskUpdate;
use taskgrid::{NewTask, TaskKind};

/// Serve one request, and return the URL to reach it, plus a handle that yields the raw request that was received
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line, body.len(), body);
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (url, handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end].lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}


#[tokio::test]
async fn list_tasks() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (url, server) = serve_once("200 OK", r###"{
        "2026-10-16": [
            {"id": 1, "date": "2026-10-16", "text": "buy milk", "completed": 0, "group_name": null},
            {"id": 2, "date": "2026-10-16", "text": "##Work", "completed": 1, "group_name": "Work"}
        ],
        "2026-11-16": [
            {"id": 3, "date": "2026-11-16", "text": "buy milk", "completed": false, "group_name": null}
        ]
    }"###).await;

    let client = Client::new(&url).unwrap();
    let tasks = client.list_tasks("tok-1").await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks["2026-10-16"].len(), 2);
    assert_eq!(tasks["2026-10-16"][1].kind(), &TaskKind::GroupHeader{ label: "Work".to_string(), completed: true });

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /tasks HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: tok-1\r\n"));
}

#[tokio::test]
async fn unauthorized_is_told_apart() {
    let (url, _server) = serve_once("401 UNAUTHORIZED", r#"{"message": "Authentication required"}"#).await;
    let err = Client::new(&url).unwrap().list_tasks("expired").await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized("Authentication required".to_string()));
}

#[tokio::test]
async fn server_messages_are_kept() {
    let (url, _server) = serve_once("409 CONFLICT", r#"{"message": "Username or email already exists"}"#).await;
    let err = Client::new(&url).unwrap().register("bob", "pw", "bob@example.com").await.unwrap_err();
    assert_eq!(err, ApiError::Rejected{ status: 409, message: "Username or email already exists".to_string() });
    assert_eq!(err.user_message(), "Username or email already exists");

    let (url, _server) = serve_once("500 Internal Server Error", "oops").await;
    let err = Client::new(&url).unwrap().delete_task("tok", 3).await.unwrap_err();
    assert_eq!(err, ApiError::Rejected{ status: 500, message: "Internal Server Error".to_string() });
}

#[tokio::test]
async fn unreachable_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = Client::new(&url).unwrap().login("alice", "secret").await.unwrap_err();
    assert!(err.is_connectivity());
    assert_eq!(err.user_message(), "Network error. Please try again.");
}

#[tokio::test]
async fn login() {
    let (url, server) = serve_once("200 OK", r#"{"message": "Login successful", "token": "tok-9", "username": "alice"}"#).await;
    let reply = Client::new(&url).unwrap().login("alice", "secret").await.unwrap();
    assert_eq!(reply.token.as_deref(), Some("tok-9"));
    assert_eq!(reply.session("ignored").unwrap().username(), Some("alice"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /login HTTP/1.1"));
    assert!(request.contains(r#""username":"alice""#));
    assert!(request.contains(r#""password":"secret""#));
}

#[tokio::test]
async fn create_and_update() {
    let (url, server) = serve_once("201 CREATED",
        r#"{"id": 12, "date": "2026-10-16", "text": "report", "completed": 0, "group_name": "Work"}"#).await;
    let client = Client::new(&url).unwrap();
    let new = NewTask::item("2026-10-16".to_string(), "report".to_string(), Some("Work".to_string()));
    let created = client.create_task("tok", &new).await.unwrap();
    assert_eq!(created.id(), 12);
    assert_eq!(created.group_name(), Some("Work"));
    assert!(created.completed() == false);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /tasks HTTP/1.1"));
    assert!(request.contains(r#""group_name":"Work""#));
    assert!(request.contains(r#""completed":false"#));

    let (url, server) = serve_once("200 OK", r#"{"message": "Task updated successfully"}"#).await;
    Client::new(&url).unwrap().update_task("tok", 12, &TaskUpdate::completed(true)).await.unwrap();
    let request = server.await.unwrap();
    assert!(request.starts_with("PUT /tasks/12 HTTP/1.1"));
    assert!(request.ends_with(r#"{"completed":true}"#));
}
