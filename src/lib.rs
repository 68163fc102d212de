//! Employee directory: a small CRUD service for employee records with
//! optional profile images, plus a typed client for it.

pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use actix_web::web;

fn employee_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(["", "/"])
            .route(web::post().to(handlers::employee::create_employee))
            .route(web::get().to(handlers::employee::get_employees)),
    )
    .service(
        web::resource("/{id}")
            .route(web::get().to(handlers::employee::get_employee))
            .route(web::put().to(handlers::employee::update_employee))
            .route(web::delete().to(handlers::employee::delete_employee)),
    );
}

/// Registers every route. Expects `web::Data<EmployeeService>` and
/// `web::Data<UploadStore>` to be present as app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::health))
        .service(web::scope("/employees").configure(employee_routes))
        // Path used by the web and mobile clients.
        .service(web::scope("/api/employees").configure(employee_routes))
        .route("/uploads/{filename}", web::get().to(handlers::uploads::serve_upload));
}
