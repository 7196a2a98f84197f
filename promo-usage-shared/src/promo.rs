//! Promo order usage record.
//!
//! These types mirror the documents stored in the `promo-order-usage` index.
//! Field names are the snake-case keys the cluster mapping expects, so they
//! must not be renamed. Optional values are skipped on serialization instead
//! of being written as `null`.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single promo usage recorded against a marketplace order.
///
/// The order ID doubles as the document ID in the search index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Promo {
    pub order_id: i64,
    pub payment_id: i64,
    pub shop_id: i64,
    pub invoice_ref_num: String,
    pub payment_gateway_id: i32,
    pub amount: f64,
    pub shipping_id: i32,
    pub is_gold_shop: bool,
    pub seller_data: UserData,
    pub buyer_data: UserData,
    pub promo_detail: PromoData,
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<FixedOffset>>,
    pub source: String,
    pub platform: String,
    pub group_id: i32,
}

impl Promo {
    /// Create a record that only carries an order ID.
    pub fn with_order_id(order_id: i64) -> Self {
        Self {
            order_id,
            ..Default::default()
        }
    }

    /// The cluster document ID for this record.
    pub fn document_id(&self) -> String {
        self.order_id.to_string()
    }
}

/// Buyer or seller attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Details of the promo that was applied to the order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ads_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finger_print: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_backdoor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_unlimited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code_usage_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_promo_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ads_id_checking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_post_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_coupon: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashback_earned: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exclusive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_rule: Option<PromoRule>,
    /// Always written, even when false.
    pub is_fraud: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_max_benefit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefit_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefit_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_benefit_percentage: Option<f64>,
    #[serde(rename = "tokopoints_earned", skip_serializing_if = "Option::is_none")]
    pub points_earned: Option<f64>,
    #[serde(rename = "tokopoints_rate", skip_serializing_if = "Option::is_none")]
    pub points_rate: Option<f64>,
}

/// Usage rule attached to a promo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
}

/// Categories, products and services a promo rule applies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coverage {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_id: Option<i32>,
}
