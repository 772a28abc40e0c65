// src/handlers/records.rs
// DOCUMENTATION: HTTP handlers for the patient's health records
// PURPOSE: Appointments, prescriptions, medical records and shop products,
// each proxied to the backend after local validation

use super::session_from;
use crate::errors::CareError;
use crate::models::{AppointmentInput, MedicalRecordInput, PrescriptionInput, ProductInput};
use crate::services::{
    AppointmentService, BackendClient, MedicalRecordService, PrescriptionService, ProductService,
};
use actix_web::{web, HttpRequest, HttpResponse, Responder};

// Appointments

pub async fn list_appointments(
    req: HttpRequest,
    client: web::Data<BackendClient>,
) -> Result<impl Responder, CareError> {
    let items = AppointmentService::list(&client, &session_from(&req)).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_appointment(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
) -> Result<impl Responder, CareError> {
    let item = AppointmentService::get(&client, &session_from(&req), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// POST /appointments
/// Book an appointment; invalid forms are rejected with every violation listed
pub async fn create_appointment(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    body: web::Json<AppointmentInput>,
) -> Result<impl Responder, CareError> {
    let item = AppointmentService::create(&client, &session_from(&req), &body).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn update_appointment(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
    body: web::Json<AppointmentInput>,
) -> Result<impl Responder, CareError> {
    let item =
        AppointmentService::update(&client, &session_from(&req), path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn delete_appointment(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
) -> Result<impl Responder, CareError> {
    AppointmentService::delete(&client, &session_from(&req), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// Prescriptions

pub async fn list_prescriptions(
    req: HttpRequest,
    client: web::Data<BackendClient>,
) -> Result<impl Responder, CareError> {
    let items = PrescriptionService::list(&client, &session_from(&req)).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_prescription(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
) -> Result<impl Responder, CareError> {
    let item = PrescriptionService::get(&client, &session_from(&req), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn create_prescription(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    body: web::Json<PrescriptionInput>,
) -> Result<impl Responder, CareError> {
    let item = PrescriptionService::create(&client, &session_from(&req), &body).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn update_prescription(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
    body: web::Json<PrescriptionInput>,
) -> Result<impl Responder, CareError> {
    let item =
        PrescriptionService::update(&client, &session_from(&req), path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn delete_prescription(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
) -> Result<impl Responder, CareError> {
    PrescriptionService::delete(&client, &session_from(&req), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// Medical records

pub async fn list_medical_records(
    req: HttpRequest,
    client: web::Data<BackendClient>,
) -> Result<impl Responder, CareError> {
    let items = MedicalRecordService::list(&client, &session_from(&req)).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_medical_record(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
) -> Result<impl Responder, CareError> {
    let item = MedicalRecordService::get(&client, &session_from(&req), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn create_medical_record(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    body: web::Json<MedicalRecordInput>,
) -> Result<impl Responder, CareError> {
    let item = MedicalRecordService::create(&client, &session_from(&req), &body).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn update_medical_record(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
    body: web::Json<MedicalRecordInput>,
) -> Result<impl Responder, CareError> {
    let item =
        MedicalRecordService::update(&client, &session_from(&req), path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn delete_medical_record(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
) -> Result<impl Responder, CareError> {
    MedicalRecordService::delete(&client, &session_from(&req), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

// Products

pub async fn list_products(
    req: HttpRequest,
    client: web::Data<BackendClient>,
) -> Result<impl Responder, CareError> {
    let items = ProductService::list(&client, &session_from(&req)).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_product(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
) -> Result<impl Responder, CareError> {
    let item = ProductService::get(&client, &session_from(&req), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn create_product(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    body: web::Json<ProductInput>,
) -> Result<impl Responder, CareError> {
    let item = ProductService::create(&client, &session_from(&req), &body).await?;
    Ok(HttpResponse::Created().json(item))
}

pub async fn update_product(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
    body: web::Json<ProductInput>,
) -> Result<impl Responder, CareError> {
    let item =
        ProductService::update(&client, &session_from(&req), path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(item))
}

pub async fn delete_product(
    req: HttpRequest,
    client: web::Data<BackendClient>,
    path: web::Path<i64>,
) -> Result<impl Responder, CareError> {
    ProductService::delete(&client, &session_from(&req), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for record routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/appointments")
            .route("", web::get().to(list_appointments))
            .route("", web::post().to(create_appointment))
            .route("/{id}", web::get().to(get_appointment))
            .route("/{id}", web::put().to(update_appointment))
            .route("/{id}", web::delete().to(delete_appointment)),
    )
    .service(
        web::scope("/prescriptions")
            .route("", web::get().to(list_prescriptions))
            .route("", web::post().to(create_prescription))
            .route("/{id}", web::get().to(get_prescription))
            .route("/{id}", web::put().to(update_prescription))
            .route("/{id}", web::delete().to(delete_prescription)),
    )
    .service(
        web::scope("/medical-records")
            .route("", web::get().to(list_medical_records))
            .route("", web::post().to(create_medical_record))
            .route("/{id}", web::get().to(get_medical_record))
            .route("/{id}", web::put().to(update_medical_record))
            .route("/{id}", web::delete().to(delete_medical_record)),
    )
    .service(
        web::scope("/products")
            .route("", web::get().to(list_products))
            .route("", web::post().to(create_product))
            .route("/{id}", web::get().to(get_product))
            .route("/{id}", web::put().to(update_product))
            .route("/{id}", web::delete().to(delete_product)),
    );
}
