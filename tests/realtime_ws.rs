//! Real-time broadcast integration tests
//!
//! Runs the router on a real socket and talks to `/ws` with
//! `tokio-tungstenite` clients.

#![cfg(feature = "ssr")]

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tribble::backend::routes::create_router;
use tribble::backend::server::AppState;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn spawn_server() -> (SocketAddr, AppState) {
    let state = common::test_state();
    let app = create_router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

fn access_token(state: &AppState, user: &str) -> String {
    state
        .tokens
        .issue_pair(user, user, &format!("{}@example.com", user), Utc::now().timestamp())
        .unwrap()
        .access_token
}

async fn connect(addr: SocketAddr, token: &str) -> Client {
    let mut request = format!("ws://{}/ws", addr).into_client_request().unwrap();
    request.headers_mut().insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    let (client, _) = connect_async(request).await.unwrap();
    client
}

async fn next_data(client: &mut Client) -> Message {
    loop {
        let message = timeout(WAIT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("read failed");
        if message.is_text() || message.is_binary() {
            return message;
        }
    }
}

async fn wait_for_members(state: &AppState, count: usize) {
    timeout(WAIT, state.realtime.hub.wait_for_members(count))
        .await
        .expect("timed out waiting for hub membership")
        .unwrap();
}

#[tokio::test]
async fn test_upgrade_requires_access_token() {
    let (addr, state) = spawn_server().await;

    let request = format!("ws://{}/ws", addr).into_client_request().unwrap();
    match connect_async(request).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
        other => panic!("expected 401, got {:?}", other.map(|(_, response)| response.status())),
    }
    assert_eq!(state.realtime.hub.member_count(), 0);
}

#[tokio::test]
async fn test_hello_reaches_everyone_including_sender() {
    let (addr, state) = spawn_server().await;
    let mut a = connect(addr, &access_token(&state, "a")).await;
    let mut b = connect(addr, &access_token(&state, "b")).await;
    wait_for_members(&state, 2).await;

    a.send(Message::text("hello")).await.unwrap();

    assert_eq!(next_data(&mut b).await, Message::text("hello"));
    assert_eq!(next_data(&mut a).await, Message::text("hello"));
}

#[tokio::test]
async fn test_closed_client_leaves_the_hub() {
    let (addr, state) = spawn_server().await;
    let mut a = connect(addr, &access_token(&state, "a")).await;
    let mut b = connect(addr, &access_token(&state, "b")).await;
    wait_for_members(&state, 2).await;

    a.close(None).await.unwrap();
    wait_for_members(&state, 1).await;

    b.send(Message::binary(vec![7u8, 8, 9])).await.unwrap();
    assert_eq!(next_data(&mut b).await, Message::binary(vec![7u8, 8, 9]));
}

#[tokio::test]
async fn test_messages_arrive_in_order() {
    let (addr, state) = spawn_server().await;
    let mut sender = connect(addr, &access_token(&state, "sender")).await;
    let mut receiver = connect(addr, &access_token(&state, "receiver")).await;
    wait_for_members(&state, 2).await;

    for i in 0..50 {
        sender.send(Message::text(format!("m{}", i))).await.unwrap();
    }

    for i in 0..50 {
        assert_eq!(next_data(&mut receiver).await, Message::text(format!("m{}", i)));
    }
}
