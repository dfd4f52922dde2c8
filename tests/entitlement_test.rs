mod common;

use chrono::{DateTime, Duration, Utc};
use common::{in_app_record, millis, receipt};
use fractic_purchase_kit::domain::entities::{
    receipt::Receipt,
    verify_result::{SubscriptionType, VerifyPurchaseResult, VerifySubscriptionResult},
};
use rstest::{fixture, rstest};
use serde_json::json;

type Kit = common::TestKit;

#[fixture]
fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_500_000_000, 0).unwrap()
}

#[rstest]
fn purchase_found_in_receipt(t0: DateTime<Utc>) {
    let receipt = receipt(json!({
        "receipt": { "in_app": [in_app_record("com.app.coins", "1000", t0)] }
    }));

    let VerifyPurchaseResult::Purchased { item } = Kit::verify_purchase("com.app.coins", &receipt)
    else {
        panic!("expected purchased");
    };
    assert_eq!(item.transaction_id, "1000");
    assert_eq!(item.quantity, 1);
    assert_eq!(item.purchase_date, t0);
}

#[rstest]
#[case::cancellation_date(json!({ "cancellation_date": "2017-07-14 02:40:00 Etc/GMT" }))]
#[case::cancellation_date_ms(json!({ "cancellation_date_ms": "1500000000000" }))]
fn cancelled_purchase_is_not_purchased(t0: DateTime<Utc>, #[case] cancellation: serde_json::Value) {
    let mut record = in_app_record("com.app.coins", "1000", t0);
    for (key, value) in cancellation.as_object().unwrap() {
        record[key] = value.clone();
    }
    let receipt = receipt(json!({ "receipt": { "in_app": [record] } }));

    assert_eq!(
        Kit::verify_purchase("com.app.coins", &receipt),
        VerifyPurchaseResult::NotPurchased
    );
}

#[rstest]
fn other_products_are_not_purchased(t0: DateTime<Utc>) {
    let receipt = receipt(json!({
        "receipt": { "in_app": [in_app_record("com.app.coins", "1000", t0)] }
    }));
    assert_eq!(
        Kit::verify_purchase("com.app.gems", &receipt),
        VerifyPurchaseResult::NotPurchased
    );
    assert_eq!(
        Kit::verify_purchase("com.app.gems", &Receipt::default()),
        VerifyPurchaseResult::NotPurchased
    );
}

#[rstest]
fn auto_renewable_uses_latest_expiry(t0: DateTime<Utc>) {
    let e1 = t0 + Duration::days(60);
    let e2 = t0 + Duration::days(30);
    let renewal = |transaction_id: &str, expires: DateTime<Utc>| {
        let mut record = in_app_record("com.app.pro", transaction_id, t0);
        record["expires_date_ms"] = json!(millis(expires));
        record
    };
    let receipt = receipt(json!({
        "receipt": { "request_date_ms": millis(t0 + Duration::days(45)) },
        "latest_receipt_info": [renewal("2", e2), renewal("1", e1)],
    }));

    let result = Kit::verify_subscription(
        SubscriptionType::AutoRenewable,
        "com.app.pro",
        &receipt,
        t0,
    );

    let VerifySubscriptionResult::Purchased { expiry_date, items } = result else {
        panic!("expected purchased, got {result:?}");
    };
    assert_eq!(expiry_date, e1);
    let expiries: Vec<_> = items
        .iter()
        .map(|i| i.subscription_expiration_date)
        .collect();
    assert_eq!(expiries, vec![Some(e1), Some(e2)]);
}

#[rstest]
fn auto_renewable_expired_relative_to_request_date(t0: DateTime<Utc>) {
    let mut record = in_app_record("com.app.pro", "1", t0);
    record["expires_date_ms"] = json!(millis(t0 + Duration::days(30)));
    let receipt = receipt(json!({
        "receipt": { "request_date_ms": millis(t0 + Duration::days(31)) },
        "latest_receipt_info": [record],
    }));

    // The receipt's own request date wins over the supplied reference time.
    let result = Kit::verify_subscription(
        SubscriptionType::AutoRenewable,
        "com.app.pro",
        &receipt,
        t0,
    );

    assert!(matches!(
        result,
        VerifySubscriptionResult::Expired { expiry_date, .. } if expiry_date == t0 + Duration::days(30)
    ));
}

#[rstest]
fn non_renewing_expires_after_valid_duration(t0: DateTime<Utc>) {
    let receipt = receipt(json!({
        "receipt": { "in_app": [in_app_record("com.app.season", "7", t0)] }
    }));
    let subscription_type = SubscriptionType::NonRenewing {
        valid_duration: Duration::seconds(2_592_000),
    };

    let result = Kit::verify_subscription(
        subscription_type,
        "com.app.season",
        &receipt,
        t0 + Duration::seconds(3_000_000),
    );

    let VerifySubscriptionResult::Expired { expiry_date, items } = result else {
        panic!("expected expired, got {result:?}");
    };
    assert_eq!(expiry_date, t0 + Duration::seconds(2_592_000));
    assert_eq!(items.len(), 1);

    let still_valid = Kit::verify_subscription(
        subscription_type,
        "com.app.season",
        &receipt,
        t0 + Duration::seconds(1_000),
    );
    assert!(matches!(
        still_valid,
        VerifySubscriptionResult::Purchased { .. }
    ));
}

#[rstest]
fn subscription_without_records_is_not_purchased(t0: DateTime<Utc>) {
    assert_eq!(
        Kit::verify_subscription(
            SubscriptionType::AutoRenewable,
            "com.app.pro",
            &Receipt::default(),
            t0,
        ),
        VerifySubscriptionResult::NotPurchased
    );
}

#[rstest]
fn evaluation_is_repeatable(t0: DateTime<Utc>) {
    let receipt = receipt(json!({
        "receipt": { "in_app": [
            in_app_record("com.app.season", "1", t0),
            in_app_record("com.app.season", "2", t0 + Duration::days(10)),
        ] }
    }));
    let subscription_type = SubscriptionType::NonRenewing {
        valid_duration: Duration::days(30),
    };
    let now = t0 + Duration::days(20);

    let first = Kit::verify_subscription(subscription_type, "com.app.season", &receipt, now);
    let second = Kit::verify_subscription(subscription_type, "com.app.season", &receipt, now);

    assert_eq!(first, second);
    assert_eq!(
        Kit::verify_purchase("com.app.season", &receipt),
        Kit::verify_purchase("com.app.season", &receipt)
    );
}
