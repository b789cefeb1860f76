use serde_json::json;
use storefront_common::models::order::NewOrderRequest;
use storefront_common::models::product::{Price, Product, ProductRequest};
use storefront_common::models::user::UpdateStateRequest;
use storefront_common::pagination::{Page, PageRequest};
use storefront_common::validation::ValidationErrors;
use validator::Validate;

#[test]
fn test_product_request_from_client_json() {
    let req: ProductRequest = serde_json::from_value(json!({
        "name": "The Rust Programming Language",
        "price": 39.9,
        "category": "books",
        "pnum": 12,
        "imgurl": "/products/trpl.png"
    }))
    .unwrap();
    req.validate().unwrap();
    assert_eq!(req.price(), Some(Price::from_cents(3990)));
    assert!(req.description.is_none());
}

#[test]
fn test_product_request_reports_every_bad_field() {
    let req: ProductRequest = serde_json::from_value(json!({
        "name": "",
        "price": -2,
        "category": "c".repeat(41),
        "pnum": -5,
        "description": "d".repeat(1001)
    }))
    .unwrap();
    let errors = ValidationErrors::from(req.validate().unwrap_err());
    let fields: Vec<&str> = errors.fields.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, vec!["category", "description", "name", "pnum", "price"]);
}

#[test]
fn test_order_request_from_client_json() {
    let req: NewOrderRequest = serde_json::from_value(json!({
        "receiver_address": "12 Harbour Rd",
        "receiver_name": "Lin",
        "receiver_phone": "13800000000",
        "items": [
            {"product_id": "product-1", "buynum": 2},
            {"product_id": "product-2", "buynum": 1}
        ]
    }))
    .unwrap();
    assert!(req.validate().is_ok());
}

#[test]
fn test_state_request_requires_state() {
    let req: UpdateStateRequest = serde_json::from_value(json!({})).unwrap();
    let errors = ValidationErrors::from(req.validate().unwrap_err());
    assert_eq!(errors.fields[0].field, "state");
    assert_eq!(errors.fields[0].message, "state must be 0 or 1");
}

#[test]
fn test_page_serializes_with_metadata() {
    let product = Product {
        id: "product-1".to_string(),
        name: "Pen".to_string(),
        price: Price::from_cents(250),
        category: None,
        pnum: 3,
        imgurl: None,
        description: None,
    };
    let page = Page::new(vec![product], 25, PageRequest::new(Some(1), Some(12), 12));
    let value = serde_json::to_value(&page).unwrap();
    assert_eq!(value["total"], 25);
    assert_eq!(value["page"], 1);
    assert_eq!(value["size"], 12);
    assert_eq!(value["total_pages"], 3);
    assert_eq!(value["items"][0]["price"], json!(2.5));
}
