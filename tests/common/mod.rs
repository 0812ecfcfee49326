#![allow(dead_code)]

use reloadly::{Service, ServiceConfig};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration with every host pointed at the mock server.
pub fn test_config(base_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::new("test-id", "test-secret");
    config.base_url = base_url.to_string();
    config.giftcards_url = base_url.to_string();
    config.auth_url = base_url.to_string();
    config
}

pub fn test_service(server: &MockServer) -> Service {
    Service::new(test_config(&server.uri()))
}

pub fn token_json() -> Value {
    json!({
        "token_type": "Bearer",
        "access_token": "test-token",
        "scope": "send-topups read-operators",
        "expires_in": 86400
    })
}

/// Mount the token endpoint so calls that re-authenticate can succeed.
pub async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json()))
        .mount(server)
        .await;
}

/// A FIXED-denomination operator whose suggested-amount map delivers 50, 100
/// and 150 INR for 1.0, 1.5 and 2.0 USD.
pub fn fixed_operator_json(operator_id: i64, name: &str) -> Value {
    json!({
        "id": operator_id,
        "operatorId": operator_id,
        "name": name,
        "denominationType": "FIXED",
        "senderCurrencyCode": "USD",
        "destinationCurrencyCode": "INR",
        "country": {"isoName": "IN", "name": "India"},
        "fx": {"rate": 52.63, "currencyCode": "INR"},
        "suggestedAmounts": [1.0, 1.5, 2.0],
        "suggestedAmountsMap": {"1": 50.0, "1.5": 100.0, "2": 150.0}
    })
}

pub fn airtel_json() -> Value {
    fixed_operator_json(200, "Airtel India")
}

/// A RANGE operator with local-amount bounds in the destination currency.
pub fn local_range_operator_json(local_min: f64, local_max: f64, rate: f64) -> Value {
    json!({
        "id": 211,
        "operatorId": 211,
        "name": "Vodafone India",
        "denominationType": "RANGE",
        "supportsLocalAmounts": true,
        "localMinAmount": local_min,
        "localMaxAmount": local_max,
        "suggestedAmountsMap": null,
        "suggestedAmounts": null,
        "fixedAmounts": null,
        "senderCurrencyCode": "USD",
        "destinationCurrencyCode": "INR",
        "country": {"isoName": "IN", "name": "India"},
        "fx": {"rate": rate, "currencyCode": "INR"}
    })
}

/// A RANGE operator whose bounds are in the payable currency.
pub fn nonlocal_range_operator_json(min: f64, max: f64, rate: f64) -> Value {
    json!({
        "id": 212,
        "operatorId": 212,
        "name": "Jio India",
        "denominationType": "RANGE",
        "supportsLocalAmounts": false,
        "minAmount": min,
        "maxAmount": max,
        "senderCurrencyCode": "USD",
        "destinationCurrencyCode": "INR",
        "country": {"isoName": "IN", "name": "India"},
        "fx": {"rate": rate, "currencyCode": "INR"}
    })
}

pub fn provider_error_json(code: &str, message: &str) -> Value {
    json!({"errorCode": code, "message": message})
}

pub fn topup_response_json(phone: &str, operator_id: i64, amount: f64) -> Value {
    json!({
        "transactionId": 4038,
        "recipientPhone": phone,
        "countryCode": "IN",
        "operatorId": operator_id,
        "operatorName": "Airtel India",
        "requestedAmount": amount,
        "deliveredAmount": 100.0,
        "deliveredAmountCurrencyCode": "INR",
        "transactionDate": "2020-09-18 08:26:27"
    })
}

/// Mount a `/topups` mock that only matches the exact request body.
pub async fn mount_topup(server: &MockServer, body: Value, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/topups"))
        .and(body_json(body))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

pub fn topup_body(phone: &str, operator_id: i64, amount: f64) -> Value {
    json!({
        "recipientPhone": {"countryCode": "IN", "number": phone},
        "operatorId": operator_id,
        "amount": amount
    })
}
