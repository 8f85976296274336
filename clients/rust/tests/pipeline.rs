use api_client::model::iso8601;
use api_client::{Client, ClientConfig, Endpoint, Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

enum Api {
    User(u64),
    Users,
}

impl Endpoint for Api {
    fn path(&self) -> String {
        match self {
            Api::User(id) => format!("/users/{id}"),
            Api::Users => "/users".to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct User {
    id: u64,
    name: String,
    #[serde(with = "iso8601")]
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct NewUser {
    name: String,
}

/// Serves one canned response per entry and hands back the raw requests.
fn serve(responses: Vec<(u16, &'static str)>) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
    let addr = listener.local_addr().expect("read local addr");
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().expect("accept request");
            stream
                .set_read_timeout(Some(Duration::from_millis(200)))
                .expect("set read timeout");
            let mut buf = Vec::new();
            let mut chunk = [0_u8; 4096];
            while let Ok(n) = stream.read(&mut chunk) {
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            seen.push(String::from_utf8_lossy(&buf).into_owned());
        }
        seen
    });
    (format!("http://{addr}"), handle)
}

#[tokio::test]
async fn typed_round_trip_over_http() {
    let (base_url, handle) = serve(vec![
        (
            200,
            r#"{"id":42,"name":"Ann","created_at":"2026-03-01T10:00:00.125Z"}"#,
        ),
        (201, r#"{"id":43,"name":"Bo","created_at":"2026-03-01T10:05:00.000Z"}"#),
    ]);
    let client = Client::from_config(&ClientConfig::new(&base_url).with_token("abc"))
        .expect("create client");

    let user: User = client.get(&Api::User(42)).await.expect("get user");
    assert_eq!(user.id, 42);
    assert_eq!(user.name, "Ann");
    assert_eq!(user.created_at.timestamp_subsec_millis(), 125);

    let created: User = client
        .post(
            &Api::Users,
            &NewUser {
                name: "Bo".to_string(),
            },
        )
        .await
        .expect("create user");
    assert_eq!(created.id, 43);

    let seen = handle.join().expect("join test server");
    assert!(seen[0].starts_with("GET /users/42 "));
    assert!(seen[0].to_ascii_lowercase().contains("authorization: bearer abc"));
    assert!(seen[1].starts_with("POST /users "));
    assert!(seen[1].ends_with(r#"{"name":"Bo"}"#));
}

#[tokio::test]
async fn error_status_round_trip_over_http() {
    let (base_url, handle) = serve(vec![(401, r#"{"message":"token expired"}"#)]);
    let client = Client::new(&base_url).expect("create client");

    let err = client
        .delete_json(&Api::User(42))
        .await
        .expect_err("401 must fail");
    assert_eq!(err.to_string(), "token expired");
    assert!(matches!(err, Error::RequestFailed { status: 401, .. }));

    let seen = handle.join().expect("join test server");
    assert!(seen[0].starts_with("DELETE /users/42 "));
    assert!(!seen[0].to_ascii_lowercase().contains("authorization:"));
}
