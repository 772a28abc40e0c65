// src/services/cart_service.rs
// DOCUMENTATION: Shopping cart items
// PURPOSE: Thin proxy over the backend cart; totals are the backend's job

use crate::errors::{CareError, ValidationErrors};
use crate::models::{AddCartItemRequest, CartItem, UpdateCartItemRequest};
use crate::services::backend_client::{BackendClient, Session};

const CART_ITEMS_PATH: &str = "/web/orders/cart/items";

pub struct CartService;

impl CartService {
    fn check_quantity(quantity: i32, errors: &mut ValidationErrors) {
        if quantity < 1 {
            errors.push("Quantity must be at least 1");
        }
    }

    pub async fn list(client: &BackendClient, session: &Session) -> Result<Vec<CartItem>, CareError> {
        client.get(CART_ITEMS_PATH, "list cart items", session).await
    }

    pub async fn add(
        client: &BackendClient,
        session: &Session,
        request: &AddCartItemRequest,
    ) -> Result<CartItem, CareError> {
        let mut errors = ValidationErrors::new();
        if request.product_id <= 0 {
            errors.push("Product is required");
        }
        Self::check_quantity(request.quantity, &mut errors);
        errors.into_result()?;

        client
            .post(CART_ITEMS_PATH, "add cart item", session, request)
            .await
    }

    pub async fn update_quantity(
        client: &BackendClient,
        session: &Session,
        item_id: i64,
        request: &UpdateCartItemRequest,
    ) -> Result<CartItem, CareError> {
        let mut errors = ValidationErrors::new();
        Self::check_quantity(request.quantity, &mut errors);
        errors.into_result()?;

        let path = format!("{}/{}", CART_ITEMS_PATH, item_id);
        client
            .put(&path, "update cart item", session, request)
            .await
    }

    pub async fn remove(client: &BackendClient, session: &Session, item_id: i64) -> Result<(), CareError> {
        let path = format!("{}/{}", CART_ITEMS_PATH, item_id);
        client.delete(&path, "remove cart item", session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_zero_quantity_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri(), "/login".to_string(), Duration::from_secs(5));
        let err = CartService::update_quantity(
            &client,
            &Session::default(),
            3,
            &UpdateCartItemRequest { quantity: 0 },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CareError::Validation(ref e) if e.errors == vec!["Quantity must be at least 1"]));
    }

    #[tokio::test]
    async fn test_add_item() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/web/orders/cart/items"))
            .and(body_json(json!({ "productId": 8, "quantity": 2 })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 1,
                "productId": 8,
                "productName": "Cetirizine",
                "quantity": 2,
                "unitPrice": 18.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri(), "/login".to_string(), Duration::from_secs(5));
        let item = CartService::add(
            &client,
            &Session::new(Some("tok".to_string())),
            &AddCartItemRequest {
                product_id: 8,
                quantity: 2,
            },
        )
        .await
        .unwrap();

        assert_eq!(item.quantity, 2);
        assert_eq!(item.product_name.as_deref(), Some("Cetirizine"));
    }
}
