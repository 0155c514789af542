//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing decoded values (not raw strings)
//! avoids false negatives from field-ordering differences.

use directory_core::{ApiError, DirectoryClient, HttpMethod, HttpResponse, UserDetail, UserSummary};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> DirectoryClient {
    DirectoryClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

/// Check an error against `expected_error` and the optional status/message.
fn assert_expected_error(name: &str, case: &serde_json::Value, err: ApiError) {
    match case["expected_error"].as_str().unwrap() {
        "FormatError" => assert!(matches!(err, ApiError::FormatError(_)), "{name}: got {err:?}"),
        "HttpError" => {
            let expected_status = case["expected_status"].as_u64().unwrap() as u16;
            assert!(
                matches!(err, ApiError::HttpError { status, .. } if status == expected_status),
                "{name}: got {err:?}"
            );
        }
        other => panic!("{name}: unknown expected_error {other}"),
    }
    if let Some(message) = case.get("expected_message") {
        assert_eq!(err.to_string(), message.as_str().unwrap(), "{name}: message");
    }
}

/// Listing and search vectors share one layout.
fn run_users_vectors(raw: &str) {
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let query = case["query"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_users_request(query);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.header("accept"), Some("application/vnd.github+json"), "{name}: accept");

        // Verify parse
        let result = c.parse_users(query, simulated(case));
        if case.get("expected_error").is_some() {
            assert_expected_error(name, case, result.unwrap_err());
        } else {
            let expected: Vec<UserSummary> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    run_users_vectors(include_str!("../../test-vectors/list.json"));
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn search_test_vectors() {
    run_users_vectors(include_str!("../../test-vectors/search.json"));
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[test]
fn get_test_vectors() {
    let raw = include_str!("../../test-vectors/get.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let handle = case["input_handle"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        // Verify build
        let req = c.build_get_user(handle).unwrap();
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");

        // Verify parse
        let result = c.parse_get_user(simulated(case));
        if case.get("expected_error").is_some() {
            assert_expected_error(name, case, result.unwrap_err());
        } else {
            let expected: UserDetail = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}
