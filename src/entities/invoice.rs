use std::{path::Path, time::Duration};

use reqwest::{
    Method,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Client,
    endpoints::{ZohoEndpoint, with_query},
    entities::{Address, Resource},
    envelope::{self, Projection},
    error::{Error, Result},
    utils::date_format::{zoho_date_format_option, zoho_datetime_format_option},
};

pub const TAX_IGST: &str = "IGST";
pub const TAX_IGST0: &str = "IGST0";
pub const TAX_IGST18: &str = "IGST18";

/// How long Zoho needs after an IRP push before the invoice reflects the
/// acknowledgement.
const EINVOICE_SETTLE_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Viewed,
    Overdue,
    Unpaid,
    PartiallyPaid,
    Paid,
    Void,
    PendingApproval,
    Approved,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A status an invoice can be explicitly moved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTransition {
    Sent,
    Void,
    Draft,
}

impl StatusTransition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Void => "void",
            Self::Draft => "draft",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EInvoiceStatus {
    Pushed,
    Cancelled,
    YetToBePushed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// IRP acknowledgement details of an e-invoice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EInvoiceDetails {
    #[serde(rename = "inv_ref_num")]
    pub invoice_reference_number: String,
    pub ack_number: String,
    pub status: EInvoiceStatus,
    pub formatted_status: String,
    pub ack_date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItemTax {
    pub tax_id: String,
    pub tax_name: String,
    pub tax_amount: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxInfo {
    pub tax_name: String,
    pub tax_amount: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub item_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_type: String,
    pub name: String,
    pub description: String,
    pub rate: Decimal,
    pub quantity: Decimal,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tax_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hsn_or_sac: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tax_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tax_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line_item_taxes: Vec<LineItemTax>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Invoice {
    pub invoice_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub contact_persons: Vec<String>,
    pub invoice_number: String,
    pub place_of_supply: String,
    pub tax_treatment: String,
    pub gst_no: String,
    pub gst_treatment: String,
    pub status: InvoiceStatus,
    #[serde(with = "zoho_date_format_option")]
    pub date: Option<Date>,
    pub payment_terms: i32,
    pub payment_terms_label: String,
    #[serde(with = "zoho_date_format_option")]
    pub due_date: Option<Date>,
    pub currency_code: String,
    pub currency_id: String,
    pub discount: Decimal,
    pub tax_id: String,
    pub reference_number: String,
    pub line_items: Vec<LineItem>,
    pub notes: String,
    pub terms: String,
    pub branch_id: String,
    pub branch_name: String,
    pub sub_total: Decimal,
    pub tax_total: Decimal,
    pub total: Decimal,
    pub taxes: Vec<TaxInfo>,
    #[serde(rename = "payment_reminder_enabled")]
    pub payment_reminder: bool,
    pub payment_made: Decimal,
    pub credits_applied: Decimal,
    pub tax_amount_withheld: Decimal,
    pub balance: Decimal,
    pub write_off_amount: Decimal,
    #[serde(with = "zoho_datetime_format_option")]
    pub created_time: Option<OffsetDateTime>,
    #[serde(with = "zoho_datetime_format_option")]
    pub last_modified_time: Option<OffsetDateTime>,
    pub invoice_url: String,
    pub country: String,
    #[serde(rename = "einvoice_details")]
    pub einvoice: EInvoiceDetails,
    pub billing_address: Address,
    pub shipping_address: Address,
}

impl Resource for Invoice {
    const KEY: &'static str = "invoice";
    const LIST_KEY: &'static str = "invoices";

    fn endpoint() -> &'static str {
        "/invoices"
    }
}

/// Parameters for creating or updating an invoice.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InvoiceParams {
    pub customer_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contact_persons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_of_supply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_treatment: Option<String>,
    #[serde(
        with = "zoho_date_format_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms_label: Option<String>,
    #[serde(
        with = "zoho_date_format_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Date>,
    pub is_inclusive_tax: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// Required by Zoho when updating an invoice that was already sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub line_items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InvoiceEmailParams {
    #[serde(rename = "send_from_org_email_id")]
    pub send_from_org_email: bool,
    pub to_mail_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc_mail_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BillingAddressParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[instrument(skip(client, params))]
pub async fn create(client: &Client, params: &InvoiceParams) -> Result<Invoice> {
    client
        .post(Invoice::endpoint(), params)
        .await?
        .project(Projection::Single)?
        .into_single()
}

#[instrument(skip(client))]
pub async fn get(client: &Client, invoice_id: &str) -> Result<Invoice> {
    client
        .get(&ZohoEndpoint::Invoice(invoice_id.to_string()).path())
        .await?
        .project(Projection::Single)?
        .into_single()
}

#[instrument(skip(client, params))]
pub async fn update(client: &Client, invoice_id: &str, params: &InvoiceParams) -> Result<Invoice> {
    client
        .put(&ZohoEndpoint::Invoice(invoice_id.to_string()).path(), params)
        .await?
        .project(Projection::Single)?
        .into_single()
}

#[instrument(skip(client, address))]
pub async fn update_billing_address(
    client: &Client,
    invoice_id: &str,
    address: &BillingAddressParams,
) -> Result<Invoice> {
    client
        .put(
            &ZohoEndpoint::InvoiceBillingAddress(invoice_id.to_string()).path(),
            address,
        )
        .await?
        .project(Projection::Single)?
        .into_single()
}

/// Push the invoice to the Indian e-invoicing portal (IRP).
///
/// Errors reported in the nested `data.errors` list fail the call. On success
/// the invoice is fetched again so the returned value carries the IRP
/// acknowledgement and reference numbers.
#[instrument(skip(client))]
pub async fn push_to_irp(client: &Client, invoice_id: &str) -> Result<Invoice> {
    client
        .post_empty(&ZohoEndpoint::InvoiceEInvoicePush(invoice_id.to_string()).path())
        .await?;
    tokio::time::sleep(EINVOICE_SETTLE_DELAY).await;
    get(client, invoice_id).await
}

/// Email the invoice to the customer with the PDF attached.
#[instrument(skip(client, params))]
pub async fn email(client: &Client, invoice_id: &str, params: &InvoiceEmailParams) -> Result<()> {
    let path = with_query(
        ZohoEndpoint::InvoiceEmail(invoice_id.to_string()).path(),
        &[("send_attachment", "true")],
    );
    let envelope = client.post(&path, params).await?;
    debug!(message = envelope.message(), "invoice emailed");
    Ok(())
}

#[instrument(skip(client))]
pub async fn update_status(
    client: &Client,
    invoice_id: &str,
    status: StatusTransition,
) -> Result<()> {
    client
        .post_empty(
            &ZohoEndpoint::InvoiceStatus(invoice_id.to_string(), status.as_str().to_string())
                .path(),
        )
        .await?;
    Ok(())
}

/// Fetch the rendered PDF of an invoice.
///
/// Zoho answers this route with a JSON envelope when it cannot render the
/// document; such bodies are decoded and their error returned.
#[instrument(skip(client))]
pub async fn pdf(client: &Client, invoice_id: &str) -> Result<Vec<u8>> {
    let path = with_query(ZohoEndpoint::InvoicesPdf.path(), &[("invoice_ids", invoice_id)]);
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/pdf"));

    let response = client.send(Method::GET, &path, None, headers).await?;
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    let body = client.read_body(response).await?;
    debug!("PDF response size: {} bytes", body.len());

    if is_json {
        envelope::parse(&body)?;
        return Err(Error::MissingPayload { key: "pdf" });
    }
    Ok(body)
}

/// Download the invoice PDF to `path`. The file is only written once the
/// whole document has been received.
#[instrument(skip(client, path))]
pub async fn download_pdf(client: &Client, invoice_id: &str, path: impl AsRef<Path>) -> Result<()> {
    let bytes = pdf(client, invoice_id).await?;
    tokio::fs::write(path.as_ref(), &bytes).await?;
    Ok(())
}
