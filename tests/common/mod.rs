#![allow(dead_code)]
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_tests_loadtest::api::{PatientApiClient, SUBSCRIPTION_KEY_HEADER};
use patient_tests_loadtest::scenario::{Profile, Scenario, UserContext};
use patient_tests_loadtest::state::ScenarioState;

pub const KEY: &str = "test-subscription-key";
pub const PATIENT_ID: &str = "8d3e7a4c-2b1f-4c3a-9e00-3f1c5bde51a4";
pub const TEST_ID: &str = "0c9d1e2f-3a4b-4c5d-8e6f-7a8b9c0d1e2f";

pub fn client_for(server: &MockServer) -> PatientApiClient {
    PatientApiClient::new(server.uri(), KEY, Duration::from_secs(5)).unwrap()
}

pub fn scenario_for(server: &MockServer, profile: Profile) -> Arc<Scenario> {
    Arc::new(
        Scenario::new(profile, client_for(server), Arc::new(ScenarioState::new())).unwrap(),
    )
}

pub fn context_for(server: &MockServer) -> UserContext {
    scenario_for(server, Profile::All).user_context(0, Some(7))
}

pub fn stored_patient(id: &str) -> Value {
    json!({
        "id": id,
        "firstName": "ABCDEF",
        "lastName": "LT_GHIJKL",
        "fullName": "ABCDEF LT_GHIJKL",
        "gender": "other",
        "dateOfBirth": "1975-06-14",
        "postCode": "3000",
        "insuranceNumber": "1234567890",
        "preferredContactNumber": "0987654321",
        "lastUpdated": "2020-05-01T10:00:00.000Z"
    })
}

/// Mounts a well-behaved API: valid requests succeed, references to id "1" are
/// rejected the way the real service rejects them.
pub async fn mount_happy_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/echo/resource"))
        .and(header(SUBSCRIPTION_KEY_HEADER, KEY))
        .respond_with(ResponseTemplate::new(200).set_body_string("sample"))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/patient/"))
        .and(body_json(json!({ "lastName": "LT" })))
        .respond_with(ResponseTemplate::new(400).set_body_string("\"firstName\" is required"))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/patient/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(stored_patient(PATIENT_ID)))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/patient/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_patient(PATIENT_ID)])))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/patient/1/tests"))
        .respond_with(ResponseTemplate::new(400).set_body_string("\"patientId\" must be a valid GUID"))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/patient/[^/]+/tests$"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": TEST_ID,
            "patientId": PATIENT_ID,
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/patient/1(/tests/)?$"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/patient/[^/]+/tests/1$"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/patient/[^/]+/tests/$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/patient/[^/]+/tests/[^/]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": TEST_ID })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/patient/[^/]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_patient(PATIENT_ID)))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/patient/[^/]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_patient(PATIENT_ID)))
        .mount(server)
        .await;
}
