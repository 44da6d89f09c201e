//! Verify request building and property decoding against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so field ordering
//! never causes false negatives.

use notion_core::{decode, ClientConfig, HttpMethod, HttpRequest, NotionClient, PropertyValue};
use serde_json::Value;

const BASE_URL: &str = "https://api.notion.com/v1";

fn client() -> NotionClient {
    NotionClient::from_config(&ClientConfig::new("secret_vectors"))
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        other => panic!("unknown method: {other}"),
    }
}

fn build(c: &NotionClient, operation: &str, input: &Value) -> HttpRequest {
    let id = input["id"].as_str().unwrap_or_default();
    let req = match operation {
        "retrieve_page" => c.build_retrieve_page(id),
        "create_page" => c.build_create_page(&input["parent"], &input["properties"]),
        "update_page" => c.build_update_page(id, &input["properties"]),
        "archive_page" => c.build_archive_page(id, input["archived"].as_bool().unwrap()),
        "retrieve_database" => c.build_retrieve_database(id),
        "query_database" => c.build_query_database(id, input["start_cursor"].as_str()),
        "retrieve_block" => c.build_retrieve_block(id),
        "update_block" => c.build_update_block(id, &input["data"]),
        other => panic!("unknown operation: {other}"),
    };
    req.unwrap()
}

/// Convert `{"Variant": payload}` (or null) from the vectors into a value.
fn expected_value(expected: &Value) -> Option<PropertyValue> {
    let (variant, payload) = expected.as_object()?.iter().next()?;
    let value = match variant.as_str() {
        "Text" => PropertyValue::Text(payload.as_str().unwrap().to_string()),
        "Number" => PropertyValue::Number(payload.as_f64().unwrap()),
        "Select" => PropertyValue::Select(payload.as_str().unwrap().to_string()),
        "MultiSelect" => PropertyValue::MultiSelect(
            payload
                .as_array()
                .unwrap()
                .iter()
                .map(|n| n.as_str().unwrap().to_string())
                .collect(),
        ),
        "Checkbox" => PropertyValue::Checkbox(payload.as_bool().unwrap()),
        "Url" => PropertyValue::Url(payload.as_str().unwrap().to_string()),
        other => panic!("unknown expected variant: {other}"),
    };
    Some(value)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let operation = case["operation"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        let req = build(&c, operation, &case["input"]);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.header("authorization"), Some("Bearer secret_vectors"), "{name}: auth");
        assert_eq!(req.header("notion-version"), Some("2021-08-16"), "{name}: version");

        match req.body.as_deref() {
            Some(body) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected_req["body"], "{name}: body");
            }
            None => assert!(expected_req["body"].is_null(), "{name}: body should be None"),
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn property_test_vectors() {
    let raw = include_str!("../../test-vectors/properties.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let decoded = decode(&case["fragment"]);
        assert_eq!(decoded, expected_value(&case["expected"]), "{name}: decoded value");
    }
}
