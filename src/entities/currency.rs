use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Client, entities::Resource, envelope::Projection, error::Result,
    utils::date_format::zoho_date_format_option,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Currency {
    pub currency_id: String,
    pub currency_code: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub price_precision: u32,
    pub is_base_currency: bool,
    pub exchange_rate: Decimal,
    #[serde(with = "zoho_date_format_option")]
    pub effective_date: Option<Date>,
}

impl Resource for Currency {
    const KEY: &'static str = "currency";
    const LIST_KEY: &'static str = "currencies";

    fn endpoint() -> &'static str {
        "/settings/currencies"
    }
}

/// List the currencies enabled for the organization.
#[instrument(skip(client))]
pub async fn list(client: &Client) -> Result<Vec<Currency>> {
    client.get(Currency::endpoint())
        .await?
        .project(Projection::List)?
        .into_list()
}
