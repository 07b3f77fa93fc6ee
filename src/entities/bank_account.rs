use serde::{Deserialize, Serialize};

use crate::{
    Client, endpoints::with_query, entities::Resource, envelope::Projection, error::Result,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankAccount {
    pub account_id: String,
    pub account_name: String,
    /// `bank` or `credit_card`
    pub account_type: String,
    pub is_active: bool,
    pub bank_name: String,
}

impl Resource for BankAccount {
    const KEY: &'static str = "bankaccount";
    const LIST_KEY: &'static str = "bankaccounts";

    fn endpoint() -> &'static str {
        "/bankaccounts"
    }
}

/// Filters for listing bank accounts, e.g. `filter_by = "Status.Active"`.
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub filter_by: String,
    pub sort_column: String,
}

#[instrument(skip(client))]
pub async fn list(client: &Client, options: &FindOptions) -> Result<Vec<BankAccount>> {
    let path = with_query(
        BankAccount::endpoint(),
        &[
            ("filter_by", options.filter_by.as_str()),
            ("sort_column", options.sort_column.as_str()),
        ],
    );
    client.get(&path)
        .await?
        .project(Projection::List)?
        .into_list()
}
