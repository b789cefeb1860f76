use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use validator::{Validate, ValidationError};

use super::product::{Price, Product};
use crate::validation::trimmed;

pub const PAYSTATE_UNPAID: i16 = 0;
pub const PAYSTATE_PAID: i16 = 1;

/// Order with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub money: Price,
    pub receiver_address: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub paystate: i16,
    pub ordertime: DateTime<Utc>,
    pub user_id: i64,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: Product,
    pub buynum: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewOrderItem {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 64, message = "product_id must be 1 to 64 characters"))]
    pub product_id: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 2147483647, message = "buynum must be at least 1"))]
    pub buynum: i64,
}

/// POST /orders
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "distinct_items", skip_on_field_errors = false))]
pub struct NewOrderRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 255, message = "receiver_address must be 1 to 255 characters"))]
    pub receiver_address: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 20, message = "receiver_name must be 1 to 20 characters"))]
    pub receiver_name: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 20, message = "receiver_phone must be 1 to 20 characters"))]
    pub receiver_phone: String,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<NewOrderItem>,
}

/// At least one item, and no product listed twice once ids are trimmed.
fn distinct_items(req: &NewOrderRequest) -> Result<(), ValidationError> {
    let message = if req.items.is_empty() {
        "order must contain at least one item".to_string()
    } else {
        let mut seen = HashSet::new();
        match req
            .items
            .iter()
            .map(|item| item.product_id.trim())
            .find(|id| !id.is_empty() && !seen.insert(*id))
        {
            Some(id) => format!("duplicate product {id}"),
            None => return Ok(()),
        }
    };
    let mut error = ValidationError::new("items");
    error.message = Some(Cow::from(message));
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrors;

    fn item(product_id: &str, buynum: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: product_id.to_string(),
            buynum,
        }
    }

    fn request(items: Vec<NewOrderItem>) -> NewOrderRequest {
        NewOrderRequest {
            receiver_address: "1 Main St".to_string(),
            receiver_name: "Ada".to_string(),
            receiver_phone: "555-0100".to_string(),
            items,
        }
    }

    #[test]
    fn test_valid_order() {
        assert!(request(vec![item("product-a", 2), item("product-b", 1)])
            .validate()
            .is_ok());
    }

    fn fields(req: NewOrderRequest) -> Vec<String> {
        let errors = ValidationErrors::from(req.validate().unwrap_err());
        errors.fields.into_iter().map(|f| f.field).collect()
    }

    #[test]
    fn test_empty_order_rejected() {
        assert_eq!(fields(request(vec![])), vec!["items"]);
    }

    #[test]
    fn test_duplicate_products_rejected() {
        let errors = ValidationErrors::from(
            request(vec![item("product-a", 1), item("product-a", 3)])
                .validate()
                .unwrap_err(),
        );
        assert_eq!(errors.fields.len(), 1);
        assert_eq!(errors.fields[0].field, "items");
        assert_eq!(errors.fields[0].message, "duplicate product product-a");
    }

    #[test]
    fn test_products_differing_only_by_whitespace_are_duplicates() {
        assert_eq!(
            fields(request(vec![item("product-1", 1), item(" product-1", 1)])),
            vec!["items"]
        );

        let req: NewOrderRequest = serde_json::from_value(serde_json::json!({
            "receiver_address": "1 Main St",
            "receiver_name": "Ada",
            "receiver_phone": "555-0100",
            "items": [
                {"product_id": "product-1", "buynum": 1},
                {"product_id": " product-1 ", "buynum": 2}
            ]
        }))
        .unwrap();
        assert_eq!(req.items[1].product_id, "product-1");
        assert_eq!(fields(req), vec!["items"]);
    }

    #[test]
    fn test_item_errors_carry_their_index() {
        assert_eq!(
            fields(request(vec![item("product-a", 1), item("product-b", 0)])),
            vec!["items[1].buynum"]
        );
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(request(vec![item("product-a", 0)]).validate().is_err());
    }
}
