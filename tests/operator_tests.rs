mod common;

use reloadly::{Denomination, Error};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn country_listing_requests_suggested_amount_tables() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operators/countries/IN"))
        .and(query_param("suggestedAmounts", "true"))
        .and(query_param("suggestedAmountsMap", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            common::airtel_json(),
            common::local_range_operator_json(20.0, 100.0, 52.63)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let service = common::test_service(&server);
    let operators = service.operators_by_country("IN").await.unwrap();

    assert_eq!(operators.len(), 2);
    assert_eq!(operators[0].denomination_type, Denomination::Fixed);
    assert_eq!(operators[0].suggested_amounts_map.len(), 3);
    assert_eq!(operators[1].denomination_type, Denomination::Range);
    assert_eq!(operators[1].local_min_amount, Some(20.0));
}

#[tokio::test]
async fn operator_lookup_by_id_hits_the_catalog_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operators/200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::airtel_json()))
        .expect(1)
        .mount(&server)
        .await;

    let service = common::test_service(&server);
    let operator = service.operator_by_id(200).await.unwrap();
    assert_eq!(operator.name, "Airtel India");
    assert_eq!(operator.country.iso_name, "IN");
}

#[tokio::test]
async fn auto_detection_resolves_an_operator_from_the_number() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operators/auto-detect/phone/+911234567890/countries/IN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::airtel_json()))
        .expect(1)
        .mount(&server)
        .await;

    let service = common::test_service(&server);
    let operator = service
        .auto_detect_operator("+911234567890", "IN")
        .await
        .unwrap();
    assert_eq!(operator.operator_id, 200);
}

#[tokio::test]
async fn failed_auto_detection_surfaces_the_provider_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operators/auto-detect/phone/+1555/countries/US"))
        .respond_with(ResponseTemplate::new(404).set_body_json(
            common::provider_error_json(
                "COULD_NOT_AUTO_DETECT_OPERATOR",
                "Could not auto detect operator for the given phone number",
            ),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let service = common::test_service(&server);
    let err = service.auto_detect_operator("+1555", "US").await.unwrap_err();
    match err {
        Error::Api {
            status, error_code, ..
        } => {
            assert_eq!(status, 404);
            assert_eq!(error_code, "COULD_NOT_AUTO_DETECT_OPERATOR");
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn search_matches_names_exactly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operators/countries/IN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            common::airtel_json(),
            common::local_range_operator_json(20.0, 100.0, 52.63)
        ])))
        .mount(&server)
        .await;

    let service = common::test_service(&server);

    let found = service.search_operator("IN", "Airtel India").await.unwrap();
    assert_eq!(found.operator_id, 200);

    // Case differences and partial names do not match.
    let err = service.search_operator("IN", "airtel india").await.unwrap_err();
    match err {
        Error::OperatorNotFound { name, country } => {
            assert_eq!(name, "airtel india");
            assert_eq!(country, "IN");
        }
        other => panic!("expected OperatorNotFound, got {:?}", other),
    }

    let err = service.search_operator("IN", "Airtel").await.unwrap_err();
    assert_eq!(err.error_code(), Some("OPERATOR_NOT_FOUND"));
}

#[tokio::test]
async fn undecodable_failure_status_becomes_a_numeric_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/operators/200"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let service = common::test_service(&server);
    let err = service.operator_by_id(200).await.unwrap_err();
    match err {
        Error::Api {
            status,
            error_code,
            message,
        } => {
            assert_eq!(status, 503);
            assert_eq!(error_code, "503");
            assert_eq!(message, "Non-200 Status Code: 503");
        }
        other => panic!("expected synthesized provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn error_bodies_win_over_success_statuses() {
    let server = MockServer::start().await;

    // A 200 whose body carries an errorCode still counts as an error.
    Mock::given(method("GET"))
        .and(path("/operators/200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            common::provider_error_json("OPERATOR_DISABLED", "Operator disabled"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let service = common::test_service(&server);
    let err = service.operator_by_id(200).await.unwrap_err();
    match err {
        Error::Api {
            status, error_code, ..
        } => {
            assert_eq!(status, 200);
            assert_eq!(error_code, "OPERATOR_DISABLED");
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}
