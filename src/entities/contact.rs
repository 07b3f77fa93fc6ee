use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Client,
    endpoints::{ZohoEndpoint, with_query},
    entities::{Address, Resource},
    envelope::Projection,
    error::Result,
    utils::date_format::zoho_datetime_format_option,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    #[default]
    Customer,
    Vendor,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactPerson {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub contact_person_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub skype: String,
    pub is_primary: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub contact_id: String,
    pub contact_name: String,
    pub company_name: String,
    pub website: String,
    pub language_code: String,
    pub contact_type: Option<ContactType>,
    pub notes: String,
    pub currency_id: String,
    pub contact_persons: Vec<ContactPerson>,
    pub billing_address: Address,
    pub shipping_address: Address,
    /// e.g. `vat_registered`, `non_gcc`, `dz_vat_not_registered`
    pub tax_treatment: String,
    pub gst_no: String,
    /// `business_gst`, `business_none`, `overseas` or `consumer`
    pub gst_treatment: String,
    pub tax_id: String,
    pub tax_name: String,
    pub status: String,
    pub country_code: String,
    /// Should match the billing state.
    pub place_of_contact: String,
    pub legal_name: String,
    pub country: String,
    #[serde(with = "zoho_datetime_format_option")]
    pub created_time: Option<OffsetDateTime>,
    #[serde(with = "zoho_datetime_format_option")]
    pub last_modified_time: Option<OffsetDateTime>,
}

impl Resource for Contact {
    const KEY: &'static str = "contact";
    const LIST_KEY: &'static str = "contacts";

    fn endpoint() -> &'static str {
        "/contacts"
    }
}

/// Parameters for creating or updating a contact.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ContactParams {
    pub contact_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_type: Option<ContactType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contact_persons: Vec<ContactPerson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_percentage: Option<rust_decimal::Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_of_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ContactParams {
    #[must_use]
    pub fn new(contact_name: impl Into<String>) -> Self {
        Self {
            contact_name: contact_name.into(),
            ..Self::default()
        }
    }
}

/// Filters for listing contacts.
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub email_contains: String,
}

/// Create a new contact.
#[instrument(skip(client, params))]
pub async fn create(client: &Client, params: &ContactParams) -> Result<Contact> {
    client
        .post(Contact::endpoint(), params)
        .await?
        .project(Projection::Single)?
        .into_single()
}

/// Retrieve a single contact by its `contact_id`.
#[instrument(skip(client))]
pub async fn get(client: &Client, contact_id: &str) -> Result<Contact> {
    client
        .get(&ZohoEndpoint::Contact(contact_id.to_string()).path())
        .await?
        .project(Projection::Single)?
        .into_single()
}

/// Retrieve the contacts matching `options`.
#[instrument(skip(client))]
pub async fn list(client: &Client, options: &FindOptions) -> Result<Vec<Contact>> {
    let path = with_query(
        Contact::endpoint(),
        &[("email_contains", options.email_contains.as_str())],
    );
    client.get(&path)
        .await?
        .project(Projection::List)?
        .into_list()
}

/// Update the contact with the given id.
#[instrument(skip(client, params))]
pub async fn update(client: &Client, contact_id: &str, params: &ContactParams) -> Result<Contact> {
    client
        .put(&ZohoEndpoint::Contact(contact_id.to_string()).path(), params)
        .await?
        .project(Projection::Single)?
        .into_single()
}

/// Delete the contact with the given id.
#[instrument(skip(client))]
pub async fn delete(client: &Client, contact_id: &str) -> Result<()> {
    client
        .delete(&ZohoEndpoint::Contact(contact_id.to_string()).path())
        .await?;
    Ok(())
}
