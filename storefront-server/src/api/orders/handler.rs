//! Order API handlers
//!
//! Creation accepts guest checkout; listing and status changes are
//! privileged. Request bodies deserialize into all-optional structs so
//! a missing field surfaces as a validation error, not a framework
//! rejection.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use surrealdb::RecordId;

use shared::models::{
    Address, CustomerDetail, Order, OrderDetail, OrderItemProduct, OrderItemView, OrderStatus,
    OrderSummary, Pagination, UserRole,
};

use crate::auth::{CurrentUser, OptionalUser, authorize};
use crate::core::ServerState;
use crate::db::repository::order::{NewOrder, OrderItemInput};
use crate::db::repository::parse_record_id;
use crate::db::{ORDER_TABLE, PRODUCT_TABLE, USER_TABLE};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN,
    validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ListParams, ok, ok_paged};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    items: Option<Vec<OrderItemRequest>>,
    coupon_code: Option<String>,
    discount: Option<Decimal>,
    shipping_address: Option<AddressRequest>,
    billing_address: Option<AddressRequest>,
    payment_method: Option<String>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderItemRequest {
    product_id: Option<String>,
    quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressRequest {
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
}

fn required_address(address: Option<AddressRequest>, field: &str) -> AppResult<Address> {
    let address = address.ok_or_else(|| AppError::validation(format!("{field} is required")))?;
    let take = |part: Option<String>, part_name: &str| -> AppResult<String> {
        let value =
            part.ok_or_else(|| AppError::validation(format!("{field}.{part_name} is required")))?;
        validate_required_text(&value, &format!("{field}.{part_name}"), MAX_ADDRESS_LEN)?;
        Ok(value)
    };
    Ok(Address {
        street: take(address.street, "street")?,
        city: take(address.city, "city")?,
        state: take(address.state, "state")?,
    })
}

fn build_new_order(request: CreateOrderRequest, actor: Option<&CurrentUser>) -> AppResult<NewOrder> {
    let items = request
        .items
        .ok_or_else(|| AppError::validation("items are required"))?;
    if items.is_empty() {
        return Err(AppError::validation("items are required"));
    }
    let mut inputs = Vec::with_capacity(items.len());
    for item in items {
        let product_id = item
            .product_id
            .ok_or_else(|| AppError::validation("items[].productId is required"))?;
        let quantity = item
            .quantity
            .ok_or_else(|| AppError::validation("items[].quantity is required"))?;
        if quantity < 1 {
            return Err(AppError::validation("items[].quantity must be at least 1"));
        }
        inputs.push(OrderItemInput {
            product: parse_record_id(&product_id, PRODUCT_TABLE)?,
            quantity,
        });
    }

    let payment_method = request
        .payment_method
        .ok_or_else(|| AppError::validation("paymentMethod is required"))?;
    validate_required_text(&payment_method, "paymentMethod", MAX_SHORT_TEXT_LEN)?;

    let name = request
        .name
        .ok_or_else(|| AppError::validation("name is required"))?;
    validate_required_text(&name, "name", MAX_NAME_LEN)?;
    let email = request
        .email
        .ok_or_else(|| AppError::validation("email is required"))?;
    validate_required_text(&email, "email", MAX_EMAIL_LEN)?;
    let phone = request
        .phone
        .ok_or_else(|| AppError::validation("phone is required"))?;
    validate_required_text(&phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&request.notes, "notes", MAX_NOTE_LEN)?;
    validate_optional_text(&request.coupon_code, "couponCode", MAX_SHORT_TEXT_LEN)?;

    let customer = actor
        .map(|user| parse_record_id(&user.id, USER_TABLE))
        .transpose()?;

    Ok(NewOrder {
        items: inputs,
        coupon_code: request.coupon_code,
        discount: request.discount,
        shipping_address: required_address(request.shipping_address, "shippingAddress")?,
        billing_address: required_address(request.billing_address, "billingAddress")?,
        payment_method,
        name,
        email,
        phone,
        notes: request.notes,
        customer,
    })
}

/// POST /order/add - guest checkout allowed; a valid token attaches the
/// customer
pub async fn create(
    State(state): State<ServerState>,
    OptionalUser(actor): OptionalUser,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let Json(request) = body.map_err(|e| AppError::validation(e.body_text()))?;
    let new_order = build_new_order(request, actor.as_ref())?;

    let created = state.orders.create(new_order).await?;
    tracing::info!(
        tracking_number = %created.tracking_number,
        total = %created.total_amount,
        "order created"
    );
    Ok(ok(created.into_view(), "Order created successfully"))
}

/// GET /order - privileged listing, searched by tracking number
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<OrderSummary>>>> {
    authorize(&user, &[UserRole::Admin])?;

    let page = state.orders.list(&params, params.status).await?;
    let pagination = Pagination::new(page.total, params.page, params.limit);

    let mut customer_ids: Vec<RecordId> = page
        .items
        .iter()
        .filter_map(|o| o.customer.clone())
        .collect();
    customer_ids.sort_by_key(|id| id.to_string());
    customer_ids.dedup();
    let briefs: HashMap<String, _> = state
        .users
        .briefs_for(customer_ids)
        .await?
        .into_iter()
        .map(|b| (b.id.clone(), b))
        .collect();

    let summaries = page
        .items
        .into_iter()
        .map(|record| {
            let customer = record
                .customer
                .as_ref()
                .and_then(|id| briefs.get(&id.to_string()).cloned());
            let order = record.into_view();
            OrderSummary {
                id: order.id,
                tracking_number: order.tracking_number,
                name: order.name,
                order_status: order.order_status,
                total_amount: order.total_amount,
                created_at: order.created_at,
                customer,
            }
        })
        .collect();
    Ok(ok_paged(summaries, pagination, "Orders fetched successfully"))
}

/// GET /order/{id} - full detail with customer, items and addresses
pub async fn detail(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let record_id = parse_record_id(&id, ORDER_TABLE)?;
    let order = state.orders.get(&record_id).await?;
    let items = state.orders.items(&record_id).await?;

    let shipping_address = state.orders.address(&order.shipping_address).await?.into_view();
    let billing_address = state.orders.address(&order.billing_address).await?.into_view();

    let customer = match &order.customer {
        Some(customer_id) => state.users.get(customer_id).await.ok().map(|u| CustomerDetail {
            id: customer_id.to_string(),
            name: u.name,
            email: u.email,
        }),
        None => None,
    };

    let mut order_items = Vec::with_capacity(items.len());
    for item in items {
        // A since-deleted product leaves only the snapshot data
        let product = state.products.get(&item.product).await.ok();
        let product = match product {
            Some(p) => OrderItemProduct {
                id: item.product.to_string(),
                cover_image: p.cover_image().map(|f| state.media.url_for(f)),
                name: p.name,
            },
            None => OrderItemProduct {
                id: item.product.to_string(),
                name: String::new(),
                cover_image: None,
            },
        };
        order_items.push(OrderItemView {
            id: item.id.clone().map(|i| i.to_string()).unwrap_or_default(),
            quantity: item.quantity,
            price: item.price,
            item_total: item.item_total(),
            product,
        });
    }

    let detail = OrderDetail {
        order: order.into_view(),
        customer,
        order_items,
        shipping_address,
        billing_address,
    };
    Ok(ok(detail, "Order fetched successfully"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    status: Option<OrderStatus>,
}

/// PATCH /order/{id}/status - privileged transition along the legal
/// table
pub async fn change_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<ChangeStatusRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Order>>> {
    authorize(&user, &[UserRole::Admin])?;
    let Json(request) = body.map_err(|e| AppError::validation(e.body_text()))?;
    let status = request
        .status
        .ok_or_else(|| AppError::validation("status is required"))?;

    let record_id = parse_record_id(&id, ORDER_TABLE)?;
    let updated = state.orders.set_status(&record_id, status).await?;
    Ok(ok(updated.into_view(), "Order status updated successfully"))
}
