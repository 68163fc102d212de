use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use employee_directory::config::AppConfig;
use employee_directory::db::{self, PgEmployeeRepository};
use employee_directory::services::employee::EmployeeService;
use employee_directory::utils::upload::UploadStore;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    let pool = db::create_pool(&config.database)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::ConnectionRefused, err))?;
    info!("Database connected");
    db::init_schema(&pool).await.map_err(io::Error::other)?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let service = web::Data::new(EmployeeService::new(Arc::new(PgEmployeeRepository::new(pool))));
    let uploads = web::Data::new(UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes));

    info!(
        "Starting server at {} (public origin {}, uploads in {})",
        config.bind_addr,
        config.public_origin,
        config.upload_dir.display()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(service.clone())
            .app_data(uploads.clone())
            .configure(employee_directory::routes)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
