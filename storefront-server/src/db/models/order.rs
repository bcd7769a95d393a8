//! Order, order item and address rows

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::models::{Address, Order, OrderStatus, PaymentStatus};

use super::millis_to_datetime;

/// Row in the `address` table
///
/// Immutable once written. Shipping and billing are always two separate
/// rows, even when field-identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub created_at: i64,
}

impl AddressRecord {
    pub fn into_view(self) -> Address {
        Address {
            street: self.street,
            city: self.city,
            state: self.state,
        }
    }
}

/// Row in the `orders` table
///
/// `customer` is NONE on guest orders. `tracking_number` carries a
/// unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub tracking_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    pub payment_method: String,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<RecordId>,
    pub shipping_address: RecordId,
    pub billing_address: RecordId,
    pub created_at: i64,
}

impl OrderRecord {
    pub fn into_view(self) -> Order {
        Order {
            id: self.id.map(|id| id.to_string()).unwrap_or_default(),
            tracking_number: self.tracking_number,
            total_amount: self.total_amount,
            coupon_code: self.coupon_code,
            discount: self.discount,
            payment_method: self.payment_method,
            order_status: self.order_status,
            payment_status: self.payment_status,
            name: self.name,
            email: self.email,
            phone: self.phone,
            notes: self.notes,
            customer_id: self.customer.map(|id| id.to_string()),
            created_at: millis_to_datetime(self.created_at),
        }
    }
}

/// Row in the `order_item` table
///
/// `price` is the unit price snapshot taken when the order was created;
/// later product price changes never touch it. The link field is
/// `order_id` rather than `order`, which is a SurrealQL keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub order_id: RecordId,
    pub product: RecordId,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub created_at: i64,
}

impl OrderItemRecord {
    pub fn item_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
