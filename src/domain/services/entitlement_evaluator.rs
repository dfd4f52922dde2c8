//! Entitlement checks against a decoded receipt.
//!
//! Both checks are pure: the same receipt and reference time always produce
//! the same result.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::{
    data::models::app_store_receipt::receipt_item_model::{is_cancelled, parse_receipt_item},
    domain::entities::{
        receipt::{Receipt, ReceiptItem},
        verify_result::{SubscriptionType, VerifyPurchaseResult, VerifySubscriptionResult},
    },
};

/// Verifies the purchase of a consumable or non-consumable product.
///
/// Returns the first uncancelled, parsable record for the product, in
/// receipt order.
pub fn verify_purchase(product_id: &str, receipt: &Receipt) -> VerifyPurchaseResult {
    match receipt_items(receipt.in_app(), product_id).into_iter().next() {
        Some(item) => VerifyPurchaseResult::Purchased { item },
        None => VerifyPurchaseResult::NotPurchased,
    }
}

/// Verifies a subscription as of `valid_until`.
///
/// All matching records are sorted by expiry date, newest first, and the
/// newest expiry is compared against the receipt's own request date, falling
/// back to `valid_until` when the receipt carries none.
pub fn verify_subscription(
    subscription_type: SubscriptionType,
    product_id: &str,
    receipt: &Receipt,
    valid_until: DateTime<Utc>,
) -> VerifySubscriptionResult {
    // latest_receipt_info describes the currently active period of an
    // auto-renewable subscription, whichever renewal the receipt was for.
    let (records, duration) = match subscription_type {
        SubscriptionType::AutoRenewable => (receipt.latest_receipt_info(), None),
        SubscriptionType::NonRenewing { valid_duration } => {
            (receipt.in_app(), Some(valid_duration))
        }
    };

    let items = receipt_items(records, product_id);
    if items.is_empty() {
        return VerifySubscriptionResult::NotPurchased;
    }

    let request_date = receipt.request_date().unwrap_or(valid_until);

    let mut dated_items = expiry_dates_and_items(items, duration);
    // Stable: items with equal expiry keep their receipt order.
    dated_items.sort_by(|a, b| b.0.cmp(&a.0));

    let Some(&(expiry_date, _)) = dated_items.first() else {
        return VerifySubscriptionResult::NotPurchased;
    };
    let items = dated_items.into_iter().map(|(_, item)| item).collect();

    if expiry_date > request_date {
        VerifySubscriptionResult::Purchased { expiry_date, items }
    } else {
        VerifySubscriptionResult::Expired { expiry_date, items }
    }
}

/// Parsed, uncancelled records matching `product_id`.
fn receipt_items(records: &[Value], product_id: &str) -> Vec<ReceiptItem> {
    let matching: Vec<&Value> = records
        .iter()
        .filter(|r| r.get("product_id").and_then(Value::as_str) == Some(product_id))
        .filter(|r| !is_cancelled(r))
        .collect();
    let items: Vec<ReceiptItem> = matching
        .iter()
        .filter_map(|r| parse_receipt_item(r))
        .collect();
    if items.len() < matching.len() {
        tracing::debug!(
            product_id,
            records = matching.len(),
            parsed = items.len(),
            "some receipt records could not be parsed"
        );
    }
    items
}

fn expiry_dates_and_items(
    items: Vec<ReceiptItem>,
    duration: Option<Duration>,
) -> Vec<(DateTime<Utc>, ReceiptItem)> {
    match duration {
        Some(duration) => items
            .into_iter()
            .filter_map(|item| {
                let Some(expiry) = item.original_purchase_date.checked_add_signed(duration) else {
                    tracing::warn!(
                        transaction_id = %item.transaction_id,
                        original_purchase_date = %item.original_purchase_date,
                        "subscription expiry out of range; skipping receipt item"
                    );
                    return None;
                };
                Some((expiry, item))
            })
            .collect(),
        None => items
            .into_iter()
            .filter_map(|item| item.subscription_expiration_date.map(|expiry| (expiry, item)))
            .collect(),
    }
}
