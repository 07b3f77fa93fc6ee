use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Client,
    entities::Resource,
    envelope::Projection,
    error::Result,
    utils::date_format::{zoho_date_format, zoho_date_format_option},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    TransferFund,
    Deposit,
    Expense,
    OwnerContribution,
    OwnerDrawings,
    InterestIncome,
    OtherIncome,
    CardPayment,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankTransaction {
    pub transaction_id: String,
    pub from_account_id: String,
    pub from_account_name: String,
    pub to_account_id: String,
    pub to_account_name: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub payment_mode: String,
    #[serde(with = "zoho_date_format_option")]
    pub date: Option<Date>,
    pub reference_number: String,
    pub description: String,
}

impl Resource for BankTransaction {
    const KEY: &'static str = "banktransaction";
    const LIST_KEY: &'static str = "banktransactions";

    fn endpoint() -> &'static str {
        "/banktransactions"
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BankTransactionParams {
    pub from_account_id: String,
    pub to_account_id: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub payment_mode: String,
    #[serde(with = "zoho_date_format")]
    pub date: Date,
    pub reference_number: String,
    pub description: String,
}

impl BankTransactionParams {
    /// A fund transfer between two of the organization's accounts.
    #[must_use]
    pub fn transfer(
        from_account_id: impl Into<String>,
        to_account_id: impl Into<String>,
        amount: Decimal,
        date: Date,
    ) -> Self {
        Self {
            from_account_id: from_account_id.into(),
            to_account_id: to_account_id.into(),
            transaction_type: TransactionType::TransferFund,
            amount,
            payment_mode: String::new(),
            date,
            reference_number: String::new(),
            description: String::new(),
        }
    }
}

#[instrument(skip(client, params))]
pub async fn create(client: &Client, params: &BankTransactionParams) -> Result<BankTransaction> {
    client
        .post(BankTransaction::endpoint(), params)
        .await?
        .project(Projection::Single)?
        .into_single()
}
