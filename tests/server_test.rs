//! End-to-end request handling over real sockets.

use std::io::Read;

use regex::Regex;
use wirepool::app::{AppResponse, Environment};
use wirepool::http::{Frontend, HandlerError};
use wirepool::routing::Router;

mod common;

fn form_router() -> Router {
    Router::builder()
        .get("/", |_| Ok("<form></form>".to_string()))
        .post("/", |ctx| {
            Ok(format!(
                "Hello, {}",
                ctx.form_data.get("who").unwrap_or_default()
            ))
        })
        .build()
}

#[test]
fn test_get_and_post_dispatch() {
    let addr = common::start_server(&common::test_config(2, 4), form_router());

    let response = common::send(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(
        response,
        b"HTTP/1.1 200 OK\r\ncontent-type: text/html\r\n\r\n<form></form>\r\n"
    );

    let response = common::send(
        addr,
        b"POST / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 8\r\n\r\nwho=Dave",
    );
    assert_eq!(common::status_of(&response), Some(200));
    assert_eq!(common::body_of(&response), b"Hello, Dave");
}

#[test]
fn test_unmatched_route_is_404() {
    let router = Router::builder().get("/only", |_| Ok(String::new())).build();
    let addr = common::start_server(&common::test_config(1, 4), router);

    let response = common::send(addr, b"GET /elsewhere HTTP/1.1\r\n\r\n");
    assert_eq!(response, b"HTTP/1.1 404 No route found\r\n\r\n\r\n");
}

#[test]
fn test_pattern_route() {
    let router = Router::builder()
        .get(Regex::new(r"^/users/[0-9]+$").unwrap(), |ctx| {
            Ok(format!("user page {}", ctx.url))
        })
        .build();
    let addr = common::start_server(&common::test_config(1, 4), router);

    let hit = common::send(addr, b"GET /users/12 HTTP/1.1\r\n\r\n");
    assert_eq!(common::body_of(&hit), b"user page /users/12");

    let miss = common::send(addr, b"GET /users/twelve HTTP/1.1\r\n\r\n");
    assert_eq!(common::status_of(&miss), Some(404));
}

#[test]
fn test_form_without_length_gets_no_response() {
    let addr = common::start_server(&common::test_config(1, 4), form_router());

    let response = common::send(
        addr,
        b"POST / HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\n",
    );
    assert!(response.is_empty());

    let response = common::send(addr, b"GET / HTTP/1.1\r\n\r\n");
    assert_eq!(common::status_of(&response), Some(200));
}

fn env_app(mut env: Environment) -> Result<AppResponse, HandlerError> {
    let mut body = String::new();
    env.input.read_to_string(&mut body)?;
    Ok(AppResponse::new(201)
        .header("content-type", "text/plain")
        .chunk(format!("{} {}", env.request_method(), env.path_info()))
        .chunk(format!(" q={}", env.query_string()))
        .chunk(format!(" port={}", env.get("SERVER_PORT").unwrap_or("?")))
        .chunk(format!(" host={}", env.get("HTTP_HOST").unwrap_or("?")))
        .chunk(format!(" body={body}")))
}

#[test]
fn test_app_frontend() {
    let addr = common::start_server(&common::test_config(2, 4), Frontend::app(env_app));

    let response = common::send(
        addr,
        b"PUT /files/a?mode=fast HTTP/1.1\r\nHost: example.test\r\nContent-Type: application/octet-stream\r\nContent-Length: 3\r\n\r\nxyz",
    );

    let expected_body = format!(
        "PUT /files/a q=mode=fast port={} host=example.test body=xyz",
        addr.port()
    );
    let expected = format!(
        "HTTP/1.1 201 Created\r\ncontent-type: text/plain\r\n\r\n{expected_body}\r\n"
    );
    assert_eq!(String::from_utf8_lossy(&response), expected);
}

#[test]
fn test_http_client_smoke() {
    let router = Router::builder()
        .get("/", |_| Ok("Hello World!".to_string()))
        .build();
    let addr = common::start_server(&common::test_config(2, 4), router);

    let client = reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .unwrap();
    let res = client.get(format!("http://{addr}/")).send().expect("server reachable");

    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("text/html")
    );
    assert!(res.text().unwrap().contains("Hello World!"));
}
