use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Client,
    endpoints::{ZohoEndpoint, with_query},
    entities::Resource,
    envelope::Projection,
    error::Result,
    utils::date_format::{zoho_date_format, zoho_date_format_option},
};

/// How a customer paid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Check,
    #[default]
    Cash,
    CreditCard,
    BankTransfer,
    BankRemittance,
    AutoTransaction,
    Others,
}

/// An invoice a payment is applied to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceInfo {
    pub invoice_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub invoice_number: String,
    #[serde(
        with = "zoho_date_format_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_amount: Option<Decimal>,
    pub amount_applied: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount_withheld: Option<Decimal>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payment {
    pub payment_id: String,
    /// Zoho reports modes in display form (e.g. `"Bank Transfer"`), so this
    /// stays a plain string.
    pub payment_mode: String,
    pub amount: Decimal,
    pub amount_refunded: Decimal,
    pub bank_charges: Decimal,
    #[serde(with = "zoho_date_format_option")]
    pub date: Option<Date>,
    pub status: String,
    pub reference_number: String,
    pub description: String,
    pub customer_id: String,
    pub customer_name: String,
    pub email: String,
    pub invoices: Vec<InvoiceInfo>,
    pub currency_code: String,
    pub currency_symbol: String,
}

impl Resource for Payment {
    const KEY: &'static str = "payment";
    const LIST_KEY: &'static str = "customerpayments";

    fn endpoint() -> &'static str {
        "/customerpayments"
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentParams {
    pub customer_id: String,
    pub payment_mode: PaymentMode,
    pub amount: Decimal,
    #[serde(with = "zoho_date_format")]
    pub date: Date,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub invoices: Vec<InvoiceInfo>,
    pub bank_charges: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contact_persons: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub customer_id: String,
}

#[instrument(skip(client, params))]
pub async fn create(client: &Client, params: &PaymentParams) -> Result<Payment> {
    client
        .post(Payment::endpoint(), params)
        .await?
        .project(Projection::Single)?
        .into_single()
}

#[instrument(skip(client))]
pub async fn get(client: &Client, payment_id: &str) -> Result<Payment> {
    client
        .get(&ZohoEndpoint::CustomerPayment(payment_id.to_string()).path())
        .await?
        .project(Projection::Single)?
        .into_single()
}

#[instrument(skip(client))]
pub async fn list(client: &Client, options: &FindOptions) -> Result<Vec<Payment>> {
    let path = with_query(
        Payment::endpoint(),
        &[("customer_id", options.customer_id.as_str())],
    );
    client.get(&path)
        .await?
        .project(Projection::List)?
        .into_list()
}

#[instrument(skip(client))]
pub async fn delete(client: &Client, payment_id: &str) -> Result<()> {
    client
        .delete(&ZohoEndpoint::CustomerPayment(payment_id.to_string()).path())
        .await?;
    Ok(())
}
