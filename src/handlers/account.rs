// src/handlers/account.rs
// DOCUMENTATION: Auth, profile and cart handlers
// PURPOSE: Everything tied to the signed-in user rather than a record type

use super::session_from;
use crate::errors::CareError;
use crate::models::{
    AddCartItemRequest, ForgotPasswordRequest, LoginRequest, ProfileInput, RegisterRequest,
    UpdateCartItemRequest,
};
use crate::services::{AuthService, BackendClient, CartService, Session};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde_json::json;

/// POST /auth/login
pub async fn login(
    client: web::Data<BackendClient>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, CareError> {
    let response = AuthService::login(&client, &Session::default(), &body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /auth/register
pub async fn register(
    client: web::Data<BackendClient>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, CareError> {
    let response = AuthService::register(&client, &Session::default(), &body).await?;
    Ok(HttpResponse::Created().json(response))
}

/// POST /auth/forgot-password
/// Always answers with the same message so account existence is not leaked
pub async fn forgot_password(
    client: web::Data<BackendClient>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<impl Responder, CareError> {
    AuthService::forgot_password(&client, &body).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "If the account exists, a reset link has been sent"
    })))
}

pub async fn get_profile(
    req: HttpRequest,
    client: web::Data<BackendClient>,
) -> Result<impl Responder, CareError> {
    let user = AuthService::profile(&client, &session_from(&req)).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn update_profile(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    body: web::Json<ProfileInput>,
) -> Result<impl Responder, CareError> {
    let user = AuthService::update_profile(&client, &session_from(&req), &body).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn list_cart_items(
    req: HttpRequest,
    client: web::Data<BackendClient>,
) -> Result<impl Responder, CareError> {
    let items = CartService::list(&client, &session_from(&req)).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn add_cart_item(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    body: web::Json<AddCartItemRequest>,
) -> Result<impl Responder, CareError> {
    let item = CartService::add(&client, &session_from(&req), &body).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn update_cart_item(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<impl Responder, CareError> {
    let item =
        CartService::update_quantity(&client, &session_from(&req), path.into_inner(), &body)
            .await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn remove_cart_item(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
) -> Result<impl Responder, CareError> {
    CartService::remove(&client, &session_from(&req), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for account routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/register", web::post().to(register))
            .route("/forgot-password", web::post().to(forgot_password)),
    )
    .service(
        web::scope("/user")
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile)),
    )
    .service(
        web::scope("/cart")
            .route("/items", web::get().to(list_cart_items))
            .route("/items", web::post().to(add_cart_item))
            .route("/items/{id}", web::put().to(update_cart_item))
            .route("/items/{id}", web::delete().to(remove_cart_item)),
    );
}
