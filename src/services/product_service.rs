// src/services/product_service.rs
// DOCUMENTATION: Pharmacy shop catalogue

use crate::errors::{CareError, ValidationErrors};
use crate::models::{Product, ProductInput, ProductPayload};
use crate::services::backend_client::{BackendClient, Resource, Session};
use crate::services::validation::{required_text, sanitize_text};

const PRODUCTS: Resource = Resource {
    path: "/web/products",
    singular: "product",
    plural: "products",
};

pub struct ProductService;

impl ProductService {
    pub fn validate(input: &ProductInput) -> Result<ProductPayload, CareError> {
        let mut errors = ValidationErrors::new();

        let name = required_text(input.name.as_deref(), "Product name is required", &mut errors);
        let category = required_text(
            input.category.as_deref(),
            "Category is required",
            &mut errors,
        );

        match input.price {
            None => errors.push("Price is required"),
            Some(price) if !price.is_finite() || price < 0.0 => {
                errors.push("Price cannot be negative")
            }
            Some(_) => {}
        }

        let stock_quantity = input.stock_quantity.unwrap_or(0);
        if stock_quantity < 0 {
            errors.push("Stock quantity cannot be negative");
        }

        match (name, category, input.price) {
            (Some(name), Some(category), Some(price)) if errors.is_empty() => Ok(ProductPayload {
                name,
                description: sanitize_text(input.description.as_deref()),
                category,
                price,
                stock_quantity,
                requires_prescription: input.requires_prescription.unwrap_or(false),
                image_url: sanitize_text(input.image_url.as_deref()),
            }),
            _ => Err(CareError::Validation(errors)),
        }
    }

    pub async fn list(client: &BackendClient, session: &Session) -> Result<Vec<Product>, CareError> {
        client.list(&PRODUCTS, session).await
    }

    pub async fn get(client: &BackendClient, session: &Session, id: i64) -> Result<Product, CareError> {
        client.fetch(&PRODUCTS, id, session).await
    }

    pub async fn create(
        client: &BackendClient,
        session: &Session,
        input: &ProductInput,
    ) -> Result<Product, CareError> {
        let payload = Self::validate(input)?;
        client.create(&PRODUCTS, &payload, session).await
    }

    pub async fn update(
        client: &BackendClient,
        session: &Session,
        id: i64,
        input: &ProductInput,
    ) -> Result<Product, CareError> {
        let payload = Self::validate(input)?;
        client.update(&PRODUCTS, id, &payload, session).await
    }

    pub async fn delete(client: &BackendClient, session: &Session, id: i64) -> Result<(), CareError> {
        client.remove(&PRODUCTS, id, session).await
    }
}
