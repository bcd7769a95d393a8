//! Order repository
//!
//! Storage side of the order workflow. Creation runs as one SurrealDB
//! transaction: address rows, the order shell, every item row and the
//! final total either all land or none do. A product vanishing mid-loop
//! throws inside the transaction and rolls the whole thing back.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use surrealdb::RecordId;

use shared::models::{Address, OrderStatus};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{AddressRecord, OrderItemRecord, OrderRecord, now_millis};
use crate::db::query::{FilterValue, ListQuery, Page, SortDirection};
use crate::db::{ADDRESS_TABLE, ORDER_ITEM_TABLE, ORDER_TABLE, new_record_key};
use crate::utils::{ListParams, generate_tracking_number};

/// One requested line item
#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product: RecordId,
    pub quantity: i64,
}

/// Fields for a new order; `customer` is NONE for guest checkout
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<OrderItemInput>,
    pub coupon_code: Option<String>,
    pub discount: Option<Decimal>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
    pub customer: Option<RecordId>,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(base: BaseRepository) -> Self {
        Self { base }
    }

    /// Create the order atomically. Retries once on a tracking number
    /// collision; the unique index is the arbiter.
    pub async fn create(&self, new: NewOrder) -> RepoResult<OrderRecord> {
        if new.items.is_empty() {
            return Err(RepoError::Validation("Order items are required".to_string()));
        }

        match self.try_create(&new, generate_tracking_number()).await {
            Err(RepoError::Duplicate(_)) => self.try_create(&new, generate_tracking_number()).await,
            other => other,
        }
    }

    async fn try_create(&self, new: &NewOrder, tracking: String) -> RepoResult<OrderRecord> {
        let mut sql = String::from("BEGIN TRANSACTION;\n");
        sql.push_str(&format!(
            "LET $shipping = (CREATE {ADDRESS_TABLE} CONTENT {{ \
             street: $ship_street, city: $ship_city, state: $ship_state, created_at: $now }});\n"
        ));
        sql.push_str(&format!(
            "LET $billing = (CREATE {ADDRESS_TABLE} CONTENT {{ \
             street: $bill_street, city: $bill_city, state: $bill_state, created_at: $now }});\n"
        ));
        sql.push_str(&format!(
            "LET $order = (CREATE type::thing('{ORDER_TABLE}', $order_key) CONTENT {{\n\
                 tracking_number: $tracking,\n\
                 total_amount: 0,\n\
                 coupon_code: $coupon,\n\
                 discount: $discount,\n\
                 payment_method: $payment_method,\n\
                 order_status: 'pending',\n\
                 payment_status: 'pending',\n\
                 name: $name,\n\
                 email: $email,\n\
                 phone: $phone,\n\
                 notes: $notes,\n\
                 customer: $customer,\n\
                 shipping_address: $shipping[0].id,\n\
                 billing_address: $billing[0].id,\n\
                 created_at: $now\n\
             }});\n"
        ));
        for i in 0..new.items.len() {
            sql.push_str(&format!(
                "LET $product_{i} = (SELECT * FROM $item_product_{i})[0];\n\
                 IF $product_{i} IS NONE {{ THROW \"Product not found\" }};\n\
                 CREATE {ORDER_ITEM_TABLE} CONTENT {{ \
                 order_id: $order[0].id, product: $item_product_{i}, \
                 quantity: $item_quantity_{i}, price: $product_{i}.price, created_at: $now }};\n"
            ));
        }
        sql.push_str(&format!(
            "LET $total = math::sum((SELECT VALUE price * quantity FROM {ORDER_ITEM_TABLE} \
             WHERE order_id = $order[0].id));\n\
             UPDATE $order[0].id SET total_amount = $total;\n\
             COMMIT TRANSACTION;"
        ));

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("now", now_millis()))
            .bind(("order_key", new_record_key()))
            .bind(("tracking", tracking.clone()))
            .bind(("coupon", new.coupon_code.clone()))
            .bind(("discount", new.discount.and_then(|d| d.to_f64())))
            .bind(("payment_method", new.payment_method.clone()))
            .bind(("name", new.name.clone()))
            .bind(("email", new.email.clone()))
            .bind(("phone", new.phone.clone()))
            .bind(("notes", new.notes.clone()))
            .bind(("customer", new.customer.clone()))
            .bind(("ship_street", new.shipping_address.street.clone()))
            .bind(("ship_city", new.shipping_address.city.clone()))
            .bind(("ship_state", new.shipping_address.state.clone()))
            .bind(("bill_street", new.billing_address.street.clone()))
            .bind(("bill_city", new.billing_address.city.clone()))
            .bind(("bill_state", new.billing_address.state.clone()));
        for (i, item) in new.items.iter().enumerate() {
            query = query
                .bind((format!("item_product_{i}"), item.product.clone()))
                .bind((format!("item_quantity_{i}"), item.quantity));
        }

        query.await?.check().map_err(map_thrown)?;

        let mut response = self
            .base
            .db()
            .query(format!(
                "SELECT * FROM {ORDER_TABLE} WHERE tracking_number = $tracking LIMIT 1"
            ))
            .bind(("tracking", tracking))
            .await?;
        let created: Vec<OrderRecord> = response.take(0)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("order create returned no row".to_string()))
    }

    pub async fn get(&self, id: &RecordId) -> RepoResult<OrderRecord> {
        let found: Option<OrderRecord> = self.base.db().select(id.clone()).await?;
        found.ok_or_else(|| RepoError::NotFound("Order not found".to_string()))
    }

    /// Apply a status transition, enforcing the legal-transition table.
    ///
    /// The write only lands if the row still holds the status the
    /// check ran against; a concurrent transition that got there first
    /// turns this one into an `InvalidTransition`.
    pub async fn set_status(&self, id: &RecordId, next: OrderStatus) -> RepoResult<OrderRecord> {
        let current = self.get(id).await?;
        if !current.order_status.can_transition_to(next) {
            return Err(RepoError::InvalidTransition(format!(
                "Cannot change order status from {} to {}",
                current.order_status.as_str(),
                next.as_str()
            )));
        }
        let updated: Option<OrderRecord> = self
            .base
            .db()
            .query(
                "UPDATE $record SET order_status = $status \
                 WHERE order_status = $current RETURN AFTER",
            )
            .bind(("record", id.clone()))
            .bind(("status", next.as_str()))
            .bind(("current", current.order_status.as_str()))
            .await?
            .check()?
            .take(0)?;
        match updated {
            Some(order) => Ok(order),
            None => {
                let now = self.get(id).await?;
                Err(RepoError::InvalidTransition(format!(
                    "Cannot change order status from {} to {}",
                    now.order_status.as_str(),
                    next.as_str()
                )))
            }
        }
    }

    /// Paginated listing, newest first, searched by tracking number
    pub async fn list(
        &self,
        params: &ListParams,
        status: Option<OrderStatus>,
    ) -> RepoResult<Page<OrderRecord>> {
        let mut query = ListQuery::new(ORDER_TABLE)
            .search_prefix("tracking_number", &params.search)
            .order_by("created_at", SortDirection::Desc)
            .page(params.page, params.limit);
        if let Some(status) = status {
            query = query.filter(
                "order_status",
                FilterValue::Text(status.as_str().to_string()),
            );
        }
        query.run(self.base.db()).await
    }

    pub async fn items(&self, order: &RecordId) -> RepoResult<Vec<OrderItemRecord>> {
        let mut response = self
            .base
            .db()
            .query(format!(
                "SELECT * FROM {ORDER_ITEM_TABLE} WHERE order_id = $order ORDER BY created_at ASC"
            ))
            .bind(("order", order.clone()))
            .await?;
        Ok(response.take(0)?)
    }

    pub async fn address(&self, id: &RecordId) -> RepoResult<AddressRecord> {
        let found: Option<AddressRecord> = self.base.db().select(id.clone()).await?;
        found.ok_or_else(|| RepoError::NotFound("Address not found".to_string()))
    }
}

/// THROWn messages come back wrapped in a generic query error; recover
/// the intended kind from the message.
fn map_thrown(err: surrealdb::Error) -> RepoError {
    let msg = err.to_string();
    if msg.contains("Product not found") {
        RepoError::NotFound("Product not found".to_string())
    } else {
        RepoError::from(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::category::{CategoryRepository, NewCategory};
    use crate::db::repository::product::{NewProduct, ProductRepository, UpdateProduct};

    struct Fixture {
        db: DbService,
        orders: OrderRepository,
        products: ProductRepository,
    }

    async fn fixture() -> Fixture {
        let db = DbService::open_in_memory().await.unwrap();
        Fixture {
            orders: OrderRepository::new(BaseRepository::new(db.client())),
            products: ProductRepository::new(BaseRepository::new(db.client())),
            db,
        }
    }

    async fn seed_product(fx: &Fixture, name: &str, price: Decimal) -> RecordId {
        let categories = CategoryRepository::new(BaseRepository::new(fx.db.client()));
        let category = match categories
            .create(NewCategory {
                name: "Shoes".to_string(),
                slug: format!("shoes-{name}"),
                description: None,
                image: "shoes.jpg".to_string(),
                parent_category: None,
            })
            .await
        {
            Ok(c) => c.id.unwrap(),
            Err(e) => panic!("category seed failed: {e:?}"),
        };
        fx.products
            .create(NewProduct {
                name: name.to_string(),
                description: "desc".to_string(),
                price,
                stock: 100,
                images: vec![format!("{name}.jpg")],
                category,
            })
            .await
            .unwrap()
            .id
            .unwrap()
    }

    fn order_for(items: Vec<OrderItemInput>) -> NewOrder {
        let address = Address {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "OR".to_string(),
        };
        NewOrder {
            items,
            coupon_code: None,
            discount: None,
            shipping_address: address.clone(),
            billing_address: address,
            payment_method: "card".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            notes: None,
            customer: None,
        }
    }

    async fn count_rows(fx: &Fixture, table: &str) -> i64 {
        let total: Option<i64> = fx
            .db
            .client()
            .query(format!("SELECT count() AS count FROM {table} GROUP ALL"))
            .await
            .unwrap()
            .take((0, "count"))
            .unwrap();
        total.unwrap_or(0)
    }

    #[tokio::test]
    async fn total_is_the_sum_of_item_snapshots() {
        let fx = fixture().await;
        let a = seed_product(&fx, "A", Decimal::from(10)).await;
        let b = seed_product(&fx, "B", Decimal::from(5)).await;

        let order = fx
            .orders
            .create(order_for(vec![
                OrderItemInput { product: a, quantity: 2 },
                OrderItemInput { product: b, quantity: 3 },
            ]))
            .await
            .unwrap();

        assert_eq!(order.total_amount, Decimal::from(35));
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert!(order.tracking_number.starts_with("TRK-"));

        let items = fx.orders.items(&order.id.clone().unwrap()).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn later_price_changes_do_not_touch_the_total() {
        let fx = fixture().await;
        let a = seed_product(&fx, "A", Decimal::from(10)).await;
        let order = fx
            .orders
            .create(order_for(vec![OrderItemInput {
                product: a.clone(),
                quantity: 2,
            }]))
            .await
            .unwrap();
        let order_id = order.id.unwrap();

        fx.products
            .update(
                &a,
                UpdateProduct {
                    price: Some(Decimal::from(99)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let refetched = fx.orders.get(&order_id).await.unwrap();
        assert_eq!(refetched.total_amount, Decimal::from(20));
        let items = fx.orders.items(&order_id).await.unwrap();
        assert_eq!(items[0].price, Decimal::from(10));
        assert_eq!(items[0].item_total(), Decimal::from(20));
    }

    #[tokio::test]
    async fn missing_product_rolls_back_everything() {
        let fx = fixture().await;
        let a = seed_product(&fx, "A", Decimal::from(10)).await;

        let err = fx
            .orders
            .create(order_for(vec![
                OrderItemInput { product: a, quantity: 1 },
                OrderItemInput {
                    product: "product:missing".parse().unwrap(),
                    quantity: 1,
                },
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)), "{err:?}");

        assert_eq!(count_rows(&fx, ORDER_TABLE).await, 0);
        assert_eq!(count_rows(&fx, ORDER_ITEM_TABLE).await, 0);
        assert_eq!(count_rows(&fx, ADDRESS_TABLE).await, 0);
    }

    #[tokio::test]
    async fn empty_item_list_is_a_validation_error() {
        let fx = fixture().await;
        let err = fx.orders.create(order_for(Vec::new())).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)), "{err:?}");
    }

    #[tokio::test]
    async fn addresses_are_two_rows_even_when_identical() {
        let fx = fixture().await;
        let a = seed_product(&fx, "A", Decimal::from(10)).await;
        let order = fx
            .orders
            .create(order_for(vec![OrderItemInput { product: a, quantity: 1 }]))
            .await
            .unwrap();

        assert_ne!(order.shipping_address, order.billing_address);
        assert_eq!(count_rows(&fx, ADDRESS_TABLE).await, 2);
        let shipping = fx.orders.address(&order.shipping_address).await.unwrap();
        let billing = fx.orders.address(&order.billing_address).await.unwrap();
        assert_eq!(shipping.street, billing.street);
    }

    #[tokio::test]
    async fn status_transitions_follow_the_table() {
        let fx = fixture().await;
        let a = seed_product(&fx, "A", Decimal::from(10)).await;
        let order = fx
            .orders
            .create(order_for(vec![OrderItemInput { product: a, quantity: 1 }]))
            .await
            .unwrap();
        let id = order.id.unwrap();

        let processing = fx
            .orders
            .set_status(&id, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(processing.order_status, OrderStatus::Processing);

        let completed = fx
            .orders
            .set_status(&id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.order_status, OrderStatus::Completed);

        let err = fx
            .orders
            .set_status(&id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidTransition(_)), "{err:?}");
    }

    #[tokio::test]
    async fn concurrent_transitions_cannot_leave_a_terminal_state() {
        let fx = fixture().await;
        let a = seed_product(&fx, "A", Decimal::from(10)).await;
        let order = fx
            .orders
            .create(order_for(vec![OrderItemInput { product: a, quantity: 1 }]))
            .await
            .unwrap();
        let id = order.id.unwrap();
        fx.orders
            .set_status(&id, OrderStatus::Processing)
            .await
            .unwrap();

        // Both transitions are legal from processing, but only one may
        // land; the loser must see InvalidTransition, never overwrite
        // the terminal state the winner reached.
        let (complete, cancel) = tokio::join!(
            fx.orders.set_status(&id, OrderStatus::Completed),
            fx.orders.set_status(&id, OrderStatus::Cancelled),
        );
        assert!(
            complete.is_ok() != cancel.is_ok(),
            "exactly one transition may win: {complete:?} / {cancel:?}"
        );
        if let Err(e) = &complete {
            assert!(matches!(e, RepoError::InvalidTransition(_)), "{e:?}");
        }
        if let Err(e) = &cancel {
            assert!(matches!(e, RepoError::InvalidTransition(_)), "{e:?}");
        }

        let final_status = fx.orders.get(&id).await.unwrap().order_status;
        assert!(final_status.is_terminal());
        let winner = if complete.is_ok() {
            OrderStatus::Completed
        } else {
            OrderStatus::Cancelled
        };
        assert_eq!(final_status, winner);
    }

    #[tokio::test]
    async fn listing_filters_by_status_and_pages() {
        let fx = fixture().await;
        let a = seed_product(&fx, "A", Decimal::from(1)).await;
        let mut first_id = None;
        for i in 0..15 {
            let order = fx
                .orders
                .create(order_for(vec![OrderItemInput {
                    product: a.clone(),
                    quantity: 1,
                }]))
                .await
                .unwrap();
            if i == 0 {
                first_id = order.id;
            }
        }
        fx.orders
            .set_status(first_id.as_ref().unwrap(), OrderStatus::Processing)
            .await
            .unwrap();

        let params = ListParams {
            page: 2,
            limit: 10,
            ..Default::default()
        };
        let page = fx.orders.list(&params, None).await.unwrap();
        assert_eq!(page.total, 15);
        assert_eq!(page.items.len(), 5);

        let processing = fx
            .orders
            .list(&ListParams::default(), Some(OrderStatus::Processing))
            .await
            .unwrap();
        assert_eq!(processing.total, 1);
        assert_eq!(processing.items[0].id, first_id);
    }

    #[tokio::test]
    async fn search_matches_tracking_number_prefix() {
        let fx = fixture().await;
        let a = seed_product(&fx, "A", Decimal::from(1)).await;
        let order = fx
            .orders
            .create(order_for(vec![OrderItemInput { product: a, quantity: 1 }]))
            .await
            .unwrap();

        let params = ListParams {
            search: order.tracking_number[..7].to_string(),
            ..Default::default()
        };
        let page = fx.orders.list(&params, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].tracking_number, order.tracking_number);
    }
}
