use anyhow::Result;
use rust_decimal_macros::dec;
use serde_json::json;
use time::macros::date;
use wiremock::{
    Mock, MockServer,
    matchers::{body_string_contains, method, path, query_param},
};

use zohobooks_rs::entities::{
    bank_account::FindOptions,
    bank_transaction::{BankTransactionParams, TransactionType},
};


#[tokio::test]
async fn list_bank_accounts_with_filters() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bankaccounts"))
        .and(query_param("filter_by", "Status.Active"))
        .and(query_param("sort_column", "account_name"))
        .and(query_param("organization_id", test_utils::ORGANIZATION_ID))
        .respond_with(test_utils::success(
            "bankaccounts",
            json!([{
                "account_id": "B1",
                "account_name": "Current Account",
                "account_type": "bank",
                "is_active": true,
                "bank_name": "HDFC"
            }]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let accounts = test_utils::api_key_client(&server)
        .bank_accounts()
        .list(&FindOptions {
            filter_by: "Status.Active".into(),
            sort_column: "account_name".into(),
        })
        .await?;
    assert_eq!(accounts.len(), 1);
    assert!(accounts[0].is_active);
    assert_eq!(accounts[0].bank_name, "HDFC");
    Ok(())
}

#[tokio::test]
async fn transfer_funds_between_accounts() -> Result<()> {
    test_utils::do_setup();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/banktransactions"))
        .and(body_string_contains("transfer_fund"))
        .respond_with(test_utils::success(
            "banktransaction",
            json!({
                "transaction_id": "T1",
                "from_account_id": "B1",
                "to_account_id": "B2",
                "transaction_type": "transfer_fund",
                "amount": 1500.0,
                "date": "2024-05-01"
            }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let params = BankTransactionParams::transfer("B1", "B2", dec!(1500), date!(2024 - 05 - 01));
    assert_eq!(params.transaction_type, TransactionType::TransferFund);

    let transaction = test_utils::api_key_client(&server)
        .bank_transactions()
        .create(&params)
        .await?;
    assert_eq!(transaction.transaction_id, "T1");
    assert_eq!(transaction.amount, dec!(1500));
    Ok(())
}
