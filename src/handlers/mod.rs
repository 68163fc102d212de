pub mod employee;
pub mod form;
pub mod uploads;

use actix_web::HttpResponse;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("Server is running...")
}
