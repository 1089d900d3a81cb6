//! Integration tests using wiremock to simulate HTTP servers.
//!
//! The base-URL registry is process-global, so every test that registers an
//! identifier uses one unique to itself, and exactly one test touches the
//! process default.

use basecall::{Error, HeaderSource, Outcome, RequestOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiremock::matchers::{any, body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestData {
    id: u32,
    name: String,
}

#[tokio::test]
async fn successful_get_request() {
    let mock_server = MockServer::start().await;

    let response_data = TestData {
        id: 1,
        name: "Test".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_data))
        .mount(&mock_server)
        .await;

    let response = basecall::get()
        .use_once(mock_server.uri())
        .path("/test")
        .json::<TestData>()
        .error_text()
        .send()
        .await
        .unwrap();

    assert!(response.ok);
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.data(), Some(&response_data));
}

#[tokio::test]
async fn method_is_fixed_at_chain_entry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/verb"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Options supplied later have no way to change the verb.
    let response = basecall::get()
        .use_once(mock_server.uri())
        .path("/verb")
        .text()
        .error_text()
        .options(RequestOptions::new().timeout(Duration::from_secs(30)))
        .send()
        .await
        .unwrap();

    assert!(response.ok);
}

#[tokio::test]
async fn json_body_sets_content_type_and_payload() {
    let mock_server = MockServer::start().await;

    let request_data = TestData {
        id: 0,
        name: "New".to_string(),
    };
    let response_data = TestData {
        id: 1,
        name: "New".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/test"))
        .and(header("content-type", "application/json"))
        .and(body_json(&request_data))
        .respond_with(ResponseTemplate::new(201).set_body_json(&response_data))
        .mount(&mock_server)
        .await;

    let response = basecall::post()
        .use_once(mock_server.uri())
        .path("/test")
        .body_json(&request_data)
        .json::<TestData>()
        .error_text()
        .send()
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 201);
    assert_eq!(response.data(), Some(&response_data));
}

#[tokio::test]
async fn raw_body_carries_declared_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/raw"))
        .and(header("content-type", "text/plain"))
        .and(body_string("hello"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let response = basecall::put()
        .use_once(mock_server.uri())
        .path("/raw")
        .body_raw_typed("hello", "text/plain")
        .none()
        .error_text()
        .send()
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 204);
    assert_eq!(response.outcome, Outcome::Success(()));
}

#[tokio::test]
async fn call_headers_override_default_headers() {
    let mock_server = MockServer::start().await;

    basecall::register_with(
        "it-header-precedence",
        mock_server.uri(),
        RequestOptions::default(),
        vec![
            HeaderSource::pair("x-api-key", "default-key"),
            HeaderSource::pair("x-default-only", "kept"),
        ],
    );

    Mock::given(method("GET"))
        .and(path("/test"))
        .and(header("x-api-key", "call-key"))
        .and(header("x-default-only", "kept"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = basecall::get()
        .use_base("it-header-precedence")
        .path("/test")
        .text()
        .error_text()
        .use_default_headers()
        .header("x-api-key", "call-key")
        .send()
        .await
        .unwrap();

    assert!(response.ok);
}

#[tokio::test]
async fn default_headers_are_inert_until_applied() {
    let mock_server = MockServer::start().await;

    basecall::register_with(
        "it-inert-defaults",
        mock_server.uri(),
        RequestOptions::default(),
        vec![HeaderSource::pair("x-api-key", "default-key")],
    );

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    basecall::get()
        .use_base("it-inert-defaults")
        .path("/test")
        .text()
        .error_text()
        .send()
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("x-api-key").is_none());
}

#[tokio::test]
async fn dedicated_headers_win_over_generic_options_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .and(header("x-shared", "from-header"))
        .and(header("x-options-only", "kept"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut options_headers = http::HeaderMap::new();
    options_headers.insert("x-shared", "from-options".parse().unwrap());
    options_headers.insert("x-options-only", "kept".parse().unwrap());

    let response = basecall::get()
        .use_once(mock_server.uri())
        .path("/test")
        .text()
        .error_text()
        .options(RequestOptions::new().headers(options_headers))
        .header("x-shared", "from-header")
        .send()
        .await
        .unwrap();

    assert!(response.ok);
}

#[tokio::test]
async fn registry_default_round_trip() {
    let mock_server = MockServer::start().await;

    basecall::register("it-process-default", mock_server.uri());
    basecall::set_default("it-process-default");

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let response = basecall::get()
        .use_default()
        .path("/test")
        .text()
        .error_text()
        .send()
        .await
        .unwrap();

    assert!(response.ok);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/test");
}

#[test]
#[should_panic(expected = "already registered")]
fn duplicate_registration_panics_before_any_network_activity() {
    basecall::register("it-duplicate", "https://first.example.com");
    basecall::register("it-duplicate", "https://second.example.com");
}

#[test]
#[should_panic(expected = "use_default_options may only be applied once")]
fn applying_default_options_twice_panics() {
    let _ = basecall::get()
        .use_once("https://example.com")
        .path("/test")
        .text()
        .error_text()
        .use_default_options()
        .use_default_options();
}

#[test]
#[should_panic(expected = "use_default_headers may only be applied once")]
fn applying_default_headers_twice_panics() {
    let _ = basecall::get()
        .use_once("https://example.com")
        .path("/test")
        .text()
        .error_text()
        .use_default_headers()
        .use_default_headers();
}

#[tokio::test]
async fn timeout_cancels_a_slow_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let started = std::time::Instant::now();
    let result = basecall::get()
        .use_once(mock_server.uri())
        .path("/slow")
        .text()
        .error_text()
        .timeout(Duration::from_millis(10))
        .send()
        .await;

    match result {
        Err(Error::Timeout { duration }) => {
            assert_eq!(duration, Duration::from_millis(10));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    // The call settled as soon as the timer fired, not after the server's
    // 500ms delay.
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn dedicated_timeout_wins_over_options_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slowish"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&mock_server)
        .await;

    // The generic options timeout of 10ms would fail this call; the
    // dedicated stage method overrides it.
    let response = basecall::get()
        .use_once(mock_server.uri())
        .path("/slowish")
        .text()
        .error_text()
        .options(RequestOptions::new().timeout(Duration::from_millis(10)))
        .timeout(Duration::from_secs(2))
        .send()
        .await
        .unwrap();

    assert!(response.ok);
}

#[tokio::test]
async fn duplicate_query_keys_are_preserved_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    basecall::get()
        .use_once(mock_server.uri())
        .path("/test?query=a")
        .query_param("query", "b")
        .text()
        .error_text()
        .send()
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("query=a&query=b"));
}

#[tokio::test]
async fn validator_rejects_mismatched_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/number"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "someCustomData": 1 })),
        )
        .mount(&mock_server)
        .await;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(rename = "someCustomData")]
        some_custom_data: serde_json::Value,
    }

    let result = basecall::get()
        .use_once(mock_server.uri())
        .path("/number")
        .json::<Payload>()
        .validate(|p| p.some_custom_data.is_boolean())
        .error_text()
        .send()
        .await;

    match result {
        Err(Error::Validation { status }) => assert_eq!(status.as_u16(), 200),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn validator_accepts_matching_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bool"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "someCustomData": true })),
        )
        .mount(&mock_server)
        .await;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(rename = "someCustomData")]
        some_custom_data: serde_json::Value,
    }

    let response = basecall::get()
        .use_once(mock_server.uri())
        .path("/bool")
        .json::<Payload>()
        .validate(|p| p.some_custom_data.is_boolean())
        .error_text()
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.data().unwrap().some_custom_data,
        serde_json::Value::Bool(true)
    );
}

#[tokio::test]
async fn fallible_validator_error_stays_downcastable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schema"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 1 })))
        .mount(&mock_server)
        .await;

    #[derive(Debug, thiserror::Error)]
    #[error("missing field `{0}`")]
    struct SchemaError(&'static str);

    let result = basecall::get()
        .use_once(mock_server.uri())
        .path("/schema")
        .json::<serde_json::Value>()
        .try_validate(|v| {
            if v.get("name").is_some() {
                Ok(())
            } else {
                Err(Box::new(SchemaError("name")).into())
            }
        })
        .error_text()
        .send()
        .await;

    match result {
        Err(Error::Validator { source }) => {
            let schema = source.downcast::<SchemaError>().unwrap();
            assert_eq!(schema.0, "name");
        }
        other => panic!("expected Validator, got {other:?}"),
    }
}

#[tokio::test]
async fn error_body_is_parsed_independently_of_success_body() {
    let mock_server = MockServer::start().await;

    #[derive(Debug, Deserialize, PartialEq)]
    struct ApiError {
        message: String,
        code: u32,
    }

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(422).set_body_json(
            serde_json::json!({ "message": "unprocessable", "code": 42 }),
        ))
        .mount(&mock_server)
        .await;

    let response = basecall::get()
        .use_once(mock_server.uri())
        .path("/broken")
        .json::<TestData>()
        .error_json::<ApiError>()
        .send()
        .await
        .unwrap();

    assert!(!response.ok);
    assert_eq!(response.status.as_u16(), 422);
    assert_eq!(
        response.error_data(),
        Some(&ApiError {
            message: "unprocessable".to_string(),
            code: 42
        })
    );
    assert!(response.data().is_none());
}

#[tokio::test]
async fn header_generator_failure_is_distinguishable_and_precedes_dispatch() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = basecall::get()
        .use_once(mock_server.uri())
        .path("/never")
        .text()
        .error_text()
        .header_fn(|| Err("token store offline".into()))
        .send()
        .await;

    match result {
        Err(Error::HeaderGeneration { source }) => {
            assert_eq!(source.to_string(), "token store offline");
        }
        other => panic!("expected HeaderGeneration, got {other:?}"),
    }
}

#[tokio::test]
async fn async_header_generator_is_resolved_before_the_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth"))
        .and(header("authorization", "Bearer async-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = basecall::get()
        .use_once(mock_server.uri())
        .path("/auth")
        .text()
        .error_text()
        .header_async_fn(|| async {
            let mut headers = http::HeaderMap::new();
            headers.insert("authorization", "Bearer async-token".parse().unwrap());
            Ok(Some(headers))
        })
        .send()
        .await
        .unwrap();

    assert!(response.ok);
}

#[tokio::test]
async fn form_parser_decodes_urlencoded_bodies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/form"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("a=1&b=two")
                .insert_header("content-type", "application/x-www-form-urlencoded"),
        )
        .mount(&mock_server)
        .await;

    let response = basecall::get()
        .use_once(mock_server.uri())
        .path("/form")
        .form()
        .error_text()
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.data(),
        Some(&vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "two".to_string()),
        ])
    );
}

#[tokio::test]
async fn no_parse_discards_the_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fire-and-forget"))
        .respond_with(ResponseTemplate::new(202).set_body_string("ignored"))
        .mount(&mock_server)
        .await;

    let response = basecall::post()
        .use_once(mock_server.uri())
        .path("/fire-and-forget")
        .no_body()
        .none()
        .error_none()
        .send()
        .await
        .unwrap();

    assert!(response.ok);
    assert_eq!(response.status.as_u16(), 202);
    assert_eq!(response.outcome, Outcome::Success(()));
}

#[tokio::test]
async fn decode_failure_preserves_status_and_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/not-json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let result = basecall::get()
        .use_once(mock_server.uri())
        .path("/not-json")
        .json::<TestData>()
        .error_text()
        .send()
        .await;

    match result {
        Err(e @ Error::Decode { .. }) => {
            assert_eq!(e.status().map(|s| s.as_u16()), Some(200));
        }
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[tokio::test]
async fn response_envelope_exposes_headers_and_latency() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .insert_header("x-custom-header", "custom-value"),
        )
        .mount(&mock_server)
        .await;

    let response = basecall::get()
        .use_once(mock_server.uri())
        .path("/meta")
        .text()
        .error_text()
        .send()
        .await
        .unwrap();

    assert_eq!(response.header("x-custom-header"), Some("custom-value"));
    // Latency is measured; it can be arbitrarily small on loopback.
    let _ = response.latency;
}

#[tokio::test]
async fn default_options_fill_gaps_without_overriding_call_options() {
    let mock_server = MockServer::start().await;

    basecall::register_with(
        "it-default-options",
        mock_server.uri(),
        // A default timeout far too small to survive the mock's delay.
        RequestOptions::new().timeout(Duration::from_millis(10)),
        Vec::new(),
    );

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&mock_server)
        .await;

    // Call-side options win on collision, so the 2s timeout stands even
    // after the defaults are applied.
    let response = basecall::get()
        .use_base("it-default-options")
        .path("/test")
        .text()
        .error_text()
        .options(RequestOptions::new().timeout(Duration::from_secs(2)))
        .use_default_options()
        .send()
        .await
        .unwrap();

    assert!(response.ok);
}
