use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storefront_common::models::order::{Order, OrderItem, PAYSTATE_PAID};
use storefront_common::models::product::Price;
use uuid::Uuid;

use super::product::ProductRow;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: String,
    pub money_cents: i64,
    pub receiver_address: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub paystate: i16,
    pub ordertime: DateTime<Utc>,
    pub user_id: i64,
}

/// An order line joined with its product
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRow {
    pub order_id: String,
    pub buynum: i32,
    #[sqlx(flatten)]
    pub product: ProductRow,
}

impl OrderRow {
    /// Build the client view from this order and the items belonging to it.
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Order {
        Order {
            id: self.id,
            money: Price::from_cents(self.money_cents),
            receiver_address: self.receiver_address,
            receiver_name: self.receiver_name,
            receiver_phone: self.receiver_phone,
            paystate: self.paystate,
            ordertime: self.ordertime,
            user_id: self.user_id,
            items: items
                .into_iter()
                .map(|i| OrderItem {
                    product: i.product.into(),
                    buynum: i.buynum,
                })
                .collect(),
        }
    }
}

/// Attach items to their orders, preserving the order of `orders`.
pub fn assemble_orders(orders: Vec<OrderRow>, mut items: Vec<OrderItemRow>) -> Vec<Order> {
    orders
        .into_iter()
        .map(|order| {
            let (mine, rest): (Vec<_>, Vec<_>) =
                items.drain(..).partition(|i| i.order_id == order.id);
            items = rest;
            order.into_order(mine)
        })
        .collect()
}

pub struct NewOrder<'a> {
    pub user_id: i64,
    pub receiver_address: &'a str,
    pub receiver_name: &'a str,
    pub receiver_phone: &'a str,
    /// (product id, quantity); product ids must be distinct
    pub items: Vec<(&'a str, i32)>,
}

/// Result of placing an order
#[derive(Debug, Clone)]
pub enum PlaceOrderOutcome {
    Placed(OrderRow),
    UnknownProduct(String),
    OutOfStock { product_id: String, available: i32 },
}

pub struct OrderRepo;

impl OrderRepo {
    /// Place an order in one transaction: lock each product, check and
    /// decrement its stock, then insert the order and its items.
    ///
    /// Products are locked in id order so concurrent orders cannot deadlock.
    pub async fn place(pool: &PgPool, order: &NewOrder<'_>) -> Result<PlaceOrderOutcome> {
        let mut items = order.items.clone();
        items.sort_by(|a, b| a.0.cmp(b.0));

        let mut tx = pool.begin().await.context("Failed to begin transaction")?;
        let mut money = Price::default();

        for (product_id, buynum) in &items {
            let stock: Option<(i64, i32)> =
                sqlx::query_as("SELECT price_cents, pnum FROM product WHERE id = $1 FOR UPDATE")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .context("Failed to lock product")?;

            let Some((price_cents, pnum)) = stock else {
                return Ok(PlaceOrderOutcome::UnknownProduct(product_id.to_string()));
            };
            if pnum < *buynum {
                return Ok(PlaceOrderOutcome::OutOfStock {
                    product_id: product_id.to_string(),
                    available: pnum,
                });
            }

            sqlx::query("UPDATE product SET pnum = pnum - $2 WHERE id = $1")
                .bind(product_id)
                .bind(buynum)
                .execute(&mut *tx)
                .await
                .context("Failed to decrement stock")?;

            money = Price::from_cents(price_cents)
                .checked_mul(i64::from(*buynum))
                .and_then(|line| money.checked_add(line))
                .context("Order total overflows")?;
        }

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (id, money_cents, receiver_address, receiver_name, receiver_phone, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, money_cents, receiver_address, receiver_name, receiver_phone, paystate, ordertime, user_id
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(money.cents())
        .bind(order.receiver_address)
        .bind(order.receiver_name)
        .bind(order.receiver_phone)
        .bind(order.user_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to create order")?;

        for (product_id, buynum) in &items {
            sqlx::query("INSERT INTO order_item (order_id, product_id, buynum) VALUES ($1, $2, $3)")
                .bind(&row.id)
                .bind(product_id)
                .bind(buynum)
                .execute(&mut *tx)
                .await
                .context("Failed to create order item")?;
        }

        tx.commit().await.context("Failed to commit order")?;
        Ok(PlaceOrderOutcome::Placed(row))
    }

    pub async fn get(pool: &PgPool, id: &str) -> Result<Option<OrderRow>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, money_cents, receiver_address, receiver_name, receiver_phone, paystate, ordertime, user_id
            FROM orders WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get order")?;
        Ok(row)
    }

    /// Items with their products for a batch of orders
    pub async fn items_for_orders(pool: &PgPool, order_ids: &[String]) -> Result<Vec<OrderItemRow>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT oi.order_id, oi.buynum,
                   p.id, p.name, p.price_cents, p.category, p.pnum, p.imgurl, p.description
            FROM order_item oi
            JOIN product p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, p.name, p.id
            "#,
        )
        .bind(order_ids)
        .fetch_all(pool)
        .await
        .context("Failed to list order items")?;
        Ok(rows)
    }

    /// A user's orders, newest first
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderRow>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, money_cents, receiver_address, receiver_name, receiver_phone, paystate, ordertime, user_id
            FROM orders
            WHERE user_id = $1
            ORDER BY ordertime DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list orders by user")?;
        Ok(rows)
    }

    /// Count a user's orders (mirrors `list_by_user()`)
    pub async fn count_by_user(pool: &PgPool, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .context("Failed to count orders by user")?;
        Ok(count.0)
    }

    /// All orders, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<OrderRow>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, money_cents, receiver_address, receiver_name, receiver_phone, paystate, ordertime, user_id
            FROM orders
            ORDER BY ordertime DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list orders")?;
        Ok(rows)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await
            .context("Failed to count orders")?;
        Ok(count.0)
    }

    /// Mark an order paid. Paying twice is a no-op.
    pub async fn mark_paid(pool: &PgPool, id: &str) -> Result<Option<OrderRow>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            UPDATE orders SET paystate = $2 WHERE id = $1
            RETURNING id, money_cents, receiver_address, receiver_name, receiver_phone, paystate, ordertime, user_id
            "#,
        )
        .bind(id)
        .bind(PAYSTATE_PAID)
        .fetch_optional(pool)
        .await
        .context("Failed to mark order paid")?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str) -> OrderRow {
        OrderRow {
            id: id.to_string(),
            money_cents: 100,
            receiver_address: "addr".to_string(),
            receiver_name: "name".to_string(),
            receiver_phone: "phone".to_string(),
            paystate: 0,
            ordertime: Utc::now(),
            user_id: 1,
        }
    }

    fn item(order_id: &str, product_id: &str) -> OrderItemRow {
        OrderItemRow {
            order_id: order_id.to_string(),
            buynum: 1,
            product: ProductRow {
                id: product_id.to_string(),
                name: product_id.to_string(),
                price_cents: 100,
                category: None,
                pnum: 0,
                imgurl: None,
                description: None,
            },
        }
    }

    #[test]
    fn test_assemble_orders_groups_items() {
        let orders = vec![order("b"), order("a"), order("c")];
        let items = vec![item("a", "p1"), item("b", "p2"), item("a", "p3")];

        let assembled = assemble_orders(orders, items);

        let ids: Vec<&str> = assembled.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(assembled[0].items.len(), 1);
        assert_eq!(assembled[1].items.len(), 2);
        assert_eq!(assembled[1].items[0].product.id, "p1");
        assert_eq!(assembled[1].items[1].product.id, "p3");
        assert!(assembled[2].items.is_empty());
    }

    #[test]
    fn test_into_order_converts_money() {
        let view = order("x").into_order(vec![]);
        assert_eq!(view.money, Price::from_cents(100));
    }
}
