use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub mod bank_account;
pub mod bank_transaction;
pub mod contact;
pub mod currency;
pub mod invoice;
pub mod payment;

/// A Zoho Books record kind.
///
/// Implementors can be constructed empty (`Default`) and know the path they
/// live under plus the envelope keys their single and list payloads use. The
/// dispatcher and decoder only ever depend on this trait.
pub trait Resource: DeserializeOwned + Default {
    /// Envelope key of a single record, e.g. `"contact"`.
    const KEY: &'static str;

    /// Envelope key of a list of records, e.g. `"contacts"`.
    const LIST_KEY: &'static str;

    /// The API endpoint path for this resource.
    fn endpoint() -> &'static str;
}

/// A postal address as used on contacts and invoices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub attention: String,
    pub address: String,
    pub street2: String,
    pub state_code: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub fax: String,
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::ZohoEndpoint;

    #[test]
    fn resource_endpoints_agree_with_typed_endpoints() {
        assert_eq!(contact::Contact::endpoint(), ZohoEndpoint::Contacts.path());
        assert_eq!(invoice::Invoice::endpoint(), ZohoEndpoint::Invoices.path());
        assert_eq!(payment::Payment::endpoint(), ZohoEndpoint::CustomerPayments.path());
        assert_eq!(
            bank_account::BankAccount::endpoint(),
            ZohoEndpoint::BankAccounts.path()
        );
        assert_eq!(
            bank_transaction::BankTransaction::endpoint(),
            ZohoEndpoint::BankTransactions.path()
        );
        assert_eq!(currency::Currency::endpoint(), ZohoEndpoint::Currencies.path());
    }

    #[test]
    fn address_tolerates_missing_fields() {
        let address: Address = serde_json::from_str(r#"{"city":"Chennai"}"#).unwrap();
        assert_eq!(address.city, "Chennai");
        assert!(address.zip.is_empty());
    }
}
