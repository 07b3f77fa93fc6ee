use miette::{Diagnostic, IntoDiagnostic, Result};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use zohobooks_rs::{Error, envelope};


#[tokio::test]
async fn error_envelope_becomes_application_error() {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts/1"))
        .respond_with(test_utils::envelope(
            json!({"code": 14, "message": "invalid organization id"}),
        ))
        .mount(&server)
        .await;

    let error = test_utils::api_key_client(&server)
        .contacts()
        .get("1")
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "invalid organization id");
    assert_eq!(error.code(), Some(14));
    assert!(error.span_trace().is_some());
}

#[tokio::test]
async fn http_status_does_not_decide_success() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts/404"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"code": 1002, "message": "Contact does not exist."})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contacts/500"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"code": 0, "contact": {"contact_id": "500"}})),
        )
        .mount(&server)
        .await;

    let client = test_utils::api_key_client(&server);
    let error = client.contacts().get("404").await.unwrap_err();
    assert!(matches!(error, Error::Application { code: 1002, .. }));

    let contact = client.contacts().get("500").await?;
    assert_eq!(contact.contact_id, "500");
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let error = test_utils::api_key_client(&server)
        .currencies()
        .list()
        .await
        .unwrap_err();
    assert!(error.is_decode(), "{error:?}");
    match error {
        Error::DeserializationError {
            length, snippet, ..
        } => {
            assert_eq!(length, 24);
            assert_eq!(snippet.as_deref(), Some("<html>Bad Gateway</html>"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn success_without_payload_is_missing_payload() {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .respond_with(test_utils::envelope(json!({"code": 0, "message": "created"})))
        .mount(&server)
        .await;

    let error = test_utils::api_key_client(&server)
        .contacts()
        .create(&zohobooks_rs::ContactParams::new("Acme"))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::MissingPayload { key: "contact" }));
    assert!(error.is_decode());
}

#[tokio::test]
async fn connection_failure_is_a_request_error() {
    test_utils::do_setup();
    let origin = test_utils::closed_origin().await;
    let client = zohobooks_rs::ClientBuilder::new()
        .api_key(test_utils::API_KEY)
        .organization_id(test_utils::ORGANIZATION_ID)
        .api_base_url(origin)
        .build()
        .unwrap();

    let error = client.currencies().list().await.unwrap_err();
    assert!(matches!(error, Error::Request(_)), "{error:?}");
    assert!(!error.is_timeout());
}

#[test]
fn errors_carry_diagnostic_codes() {
    let error = envelope::parse(br#"{"code":57,"message":"You are not authorized"}"#).unwrap_err();
    assert_eq!(
        Diagnostic::code(&error).map(|code| code.to_string()),
        Some("zohobooks_rs::api_error".to_string())
    );

    let error = Error::Config("organization id is not set".to_string());
    assert!(Diagnostic::help(&error).is_some());
}

#[test]
fn errors_convert_into_miette_reports() {
    fn decode() -> Result<()> {
        envelope::parse(b"{").into_diagnostic()?;
        Ok(())
    }

    let report = decode().unwrap_err();
    assert!(report.to_string().starts_with("error decoding response (1 bytes)"));
}
