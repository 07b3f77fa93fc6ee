#[macro_use]
extern crate tracing;

use anyhow::Result;
use serde_json::json;
use wiremock::{
    Mock, MockServer,
    matchers::{body_string_contains, method, path, query_param, query_param_is_missing},
};

use zohobooks_rs::entities::contact::{self, ContactParams, ContactType};


#[tokio::test]
async fn create_contact() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .and(body_string_contains("JSONString="))
        .respond_with(test_utils::success(
            "contact",
            json!({"contact_id": "C1", "contact_name": "Acme", "contact_type": "customer"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_utils::api_key_client(&server);
    let params = ContactParams {
        contact_type: Some(ContactType::Customer),
        ..ContactParams::new("Acme")
    };
    let created = client.contacts().create(&params).await?;
    info!("created contact: {:?}", created);
    assert_eq!(created.contact_id, "C1");
    assert_eq!(created.contact_name, "Acme");
    Ok(())
}

#[tokio::test]
async fn list_contacts_filters_by_email() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param("email_contains", "billing@acme.test"))
        .respond_with(test_utils::success(
            "contacts",
            json!([{"contact_id": "C1"}, {"contact_id": "C2"}]),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(query_param_is_missing("email_contains"))
        .respond_with(test_utils::success("contacts", json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_utils::api_key_client(&server);
    let contacts = client
        .contacts()
        .list(&contact::FindOptions {
            email_contains: "billing@acme.test".into(),
        })
        .await?;
    assert_eq!(contacts.len(), 2);
    assert!(client.contacts().list_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn update_and_delete_contact() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/contacts/C1"))
        .and(body_string_contains("Acme+Holdings"))
        .respond_with(test_utils::success(
            "contact",
            json!({"contact_id": "C1", "contact_name": "Acme Holdings"}),
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/contacts/C1"))
        .respond_with(test_utils::envelope(
            json!({"code": 0, "message": "The contact has been deleted."}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_utils::api_key_client(&server);
    let updated = client
        .contacts()
        .update("C1", &ContactParams::new("Acme Holdings"))
        .await?;
    assert_eq!(updated.contact_name, "Acme Holdings");

    contact::delete(&client, "C1").await?;
    Ok(())
}

#[tokio::test]
async fn get_contact_reports_unknown_id() {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contacts/missing"))
        .respond_with(test_utils::envelope(
            json!({"code": 1002, "message": "Contact does not exist."}),
        ))
        .mount(&server)
        .await;

    let error = test_utils::api_key_client(&server)
        .contacts()
        .get("missing")
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "Contact does not exist.");
}
