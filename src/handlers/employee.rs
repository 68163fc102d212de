use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::handlers::form::read_submission;
use crate::services::employee::EmployeeService;
use crate::utils::upload::UploadStore;

#[derive(Deserialize)]
pub struct EmployeeQueryParams {
    department: Option<String>,
}

pub async fn create_employee(
    req: HttpRequest,
    payload: web::Payload,
    service: web::Data<EmployeeService>,
    uploads: web::Data<UploadStore>,
) -> Result<HttpResponse, AppError> {
    let submission = read_submission(&req, payload, &uploads).await?;
    let employee = service.create(submission.fields, submission.image).await?;
    Ok(HttpResponse::Created().json(employee))
}

pub async fn get_employees(
    service: web::Data<EmployeeService>,
    query: web::Query<EmployeeQueryParams>,
) -> Result<HttpResponse, AppError> {
    let employees = service.list(query.department.as_deref()).await?;
    Ok(HttpResponse::Ok().json(employees))
}

pub async fn get_employee(
    service: web::Data<EmployeeService>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee = service.get(&id).await?;
    Ok(HttpResponse::Ok().json(employee))
}

pub async fn update_employee(
    req: HttpRequest,
    payload: web::Payload,
    service: web::Data<EmployeeService>,
    uploads: web::Data<UploadStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let submission = read_submission(&req, payload, &uploads).await?;
    let employee = service.update(&id, submission.fields, submission.image).await?;
    Ok(HttpResponse::Ok().json(employee))
}

pub async fn delete_employee(
    service: web::Data<EmployeeService>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    service.delete(&id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
    })))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    use crate::db::InMemoryEmployeeRepository;
    use crate::handlers::form::MAX_JSON_BYTES;
    use crate::services::employee::EmployeeService;
    use crate::utils::upload::tests::PNG;
    use crate::utils::upload::UploadStore;

    const BOUNDARY: &str = "----directory-test-boundary";

    fn test_app(
        upload_root: &Path,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        test_app_with_upload_limit(upload_root, 1024 * 1024)
    }

    fn test_app_with_upload_limit(
        upload_root: &Path,
        max_upload_bytes: usize,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let service = EmployeeService::new(Arc::new(InMemoryEmployeeRepository::new()));
        App::new()
            .app_data(web::Data::new(service))
            .app_data(web::Data::new(UploadStore::new(upload_root, max_upload_bytes)))
            .configure(crate::routes)
    }

    fn push_part(body: &mut Vec<u8>, name: &str, filename: Option<&str>, value: &[u8]) {
        let disposition = match filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: image/png"
            ),
            None => format!("Content-Disposition: form-data; name=\"{name}\""),
        };
        body.extend_from_slice(format!("--{BOUNDARY}\r\n{disposition}\r\n\r\n").as_bytes());
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
    }

    fn multipart_body(fields: &[(&str, &str)], image: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            push_part(&mut body, name, None, value.as_bytes());
        }
        if let Some(bytes) = image {
            push_part(&mut body, "image_url", Some("me.png"), bytes);
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(method: test::TestRequest, fields: &[(&str, &str)], image: Option<&[u8]>) -> test::TestRequest {
        method
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(fields, image))
    }

    fn ada(email: &str, department: &str) -> Value {
        json!({
            "Full_name": "Ada Lovelace",
            "position": "Engineer",
            "department": department,
            "email": email,
        })
    }

    #[actix_web::test]
    async fn create_from_json_omits_image() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(ada("ada@x.com", "IT"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["_id"].is_string());
        assert!(body["createdAt"].is_string());
        assert!(body["updatedAt"].is_string());
        assert!(body.get("image_url").is_none());
        assert_eq!(body["Full_name"], "Ada Lovelace");
    }

    #[actix_web::test]
    async fn create_from_multipart_stores_image() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = multipart_request(
            test::TestRequest::post().uri("/api/employees"),
            &[
                ("Full_name", "Ada Lovelace"),
                ("position", "Engineer"),
                ("department", "IT"),
                ("email", " Ada@X.com "),
            ],
            Some(PNG),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["email"], "ada@x.com");
        let image_url = body["image_url"].as_str().unwrap();
        let filename = image_url.strip_prefix("/uploads/").unwrap();
        assert!(dir.path().join(filename).exists());

        let req = test::TestRequest::get().uri(image_url).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(test::read_body(resp).await.as_ref(), PNG);
    }

    #[actix_web::test]
    async fn create_rejects_non_image_upload() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = multipart_request(
            test::TestRequest::post().uri("/employees"),
            &[("Full_name", "A"), ("position", "P"), ("department", "IT"), ("email", "a@x.com")],
            Some(b"plain text, not an image"),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn duplicate_email_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        for expected in [StatusCode::CREATED, StatusCode::BAD_REQUEST] {
            let req = test::TestRequest::post()
                .uri("/employees")
                .set_json(ada("ada@x.com", "IT"))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }

        let req = test::TestRequest::get().uri("/employees").to_request();
        let list: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.len(), 1);
    }

    #[actix_web::test]
    async fn missing_fields_are_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(json!({ "position": "Engineer" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().starts_with("Validation failed"));
    }

    #[actix_web::test]
    async fn lists_by_department() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;
        for (email, department) in [("a@x.com", "Finance"), ("b@x.com", "IT"), ("c@x.com", "Finance")] {
            let req = test::TestRequest::post()
                .uri("/employees")
                .set_json(ada(email, department))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get().uri("/employees?department=Finance").to_request();
        let finance: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(finance.len(), 2);
        assert!(finance.iter().all(|employee| employee["department"] == "Finance"));

        let req = test::TestRequest::get().uri("/employees").to_request();
        let all: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all.len(), 3);
    }

    #[actix_web::test]
    async fn update_without_file_keeps_image() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = multipart_request(
            test::TestRequest::post().uri("/employees"),
            &[("Full_name", "A"), ("position", "P"), ("department", "IT"), ("email", "a@x.com")],
            Some(PNG),
        )
        .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["_id"].as_str().unwrap();

        let req = multipart_request(
            test::TestRequest::put().uri(&format!("/employees/{id}")),
            &[("Full_name", "A"), ("position", "P"), ("department", "HR"), ("email", "a@x.com")],
            None,
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: Value = test::read_body_json(resp).await;

        assert_eq!(updated["department"], "HR");
        assert_eq!(updated["image_url"], created["image_url"]);
        assert_eq!(updated["_id"], created["_id"]);
        assert_eq!(updated["createdAt"], created["createdAt"]);
    }

    #[actix_web::test]
    async fn update_with_file_replaces_image_and_keeps_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;
        let fields = [("Full_name", "A"), ("position", "P"), ("department", "IT"), ("email", "a@x.com")];

        let req = multipart_request(test::TestRequest::post().uri("/employees"), &fields, Some(PNG)).to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["_id"].as_str().unwrap();
        let old_url = created["image_url"].as_str().unwrap().to_owned();

        let req = multipart_request(
            test::TestRequest::put().uri(&format!("/employees/{id}")),
            &fields,
            Some(PNG),
        )
        .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        let new_url = updated["image_url"].as_str().unwrap();

        assert_ne!(new_url, old_url);
        assert!(dir.path().join(old_url.trim_start_matches("/uploads/")).exists());
        assert!(dir.path().join(new_url.trim_start_matches("/uploads/")).exists());
    }

    #[actix_web::test]
    async fn update_ignores_server_owned_fields() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(ada("ada@x.com", "IT"))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let id = created["_id"].as_str().unwrap();

        let mut payload = ada("ada@x.com", "HR");
        payload["_id"] = json!("00000000-0000-0000-0000-000000000000");
        payload["createdAt"] = json!("2001-01-01T00:00:00Z");
        let req = test::TestRequest::put()
            .uri(&format!("/employees/{id}"))
            .set_json(payload)
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(updated["_id"], created["_id"]);
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_eq!(updated["department"], "HR");
    }

    #[actix_web::test]
    async fn unknown_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;
        let missing = "/employees/6f1c1d7e-0c1a-4d0f-9c55-0d6b0c1f7a11";

        let req = test::TestRequest::get().uri(missing).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::put().uri(missing).set_json(ada("a@x.com", "IT")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete().uri(missing).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].is_string());

        let req = test::TestRequest::get().uri("/employees/not-an-id").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn delete_then_get_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(ada("ada@x.com", "IT"))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/employees/{}", created["_id"].as_str().unwrap());

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Employee deleted successfully");

        let req = test::TestRequest::get().uri(&uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_upload_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = test::TestRequest::get().uri("/uploads/nothing.png").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn create_accepts_mixed_case_multipart_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .insert_header((
                header::CONTENT_TYPE,
                format!("Multipart/Form-Data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(
                &[("Full_name", "A"), ("position", "P"), ("department", "IT"), ("email", "a@x.com")],
                Some(PNG),
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["image_url"].as_str().unwrap().starts_with("/uploads/"));
    }

    #[actix_web::test]
    async fn empty_image_part_is_no_upload() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = multipart_request(
            test::TestRequest::post().uri("/employees"),
            &[("Full_name", "A"), ("position", "P"), ("department", "IT"), ("email", "a@x.com")],
            Some(b""),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert!(body.get("image_url").is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn non_utf8_text_part_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let mut body = Vec::new();
        push_part(&mut body, "Full_name", None, &[0xFF, 0xFE]);
        push_part(&mut body, "position", None, b"P");
        push_part(&mut body, "department", None, b"IT");
        push_part(&mut body, "email", None, b"a@x.com");
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = test::TestRequest::post()
            .uri("/employees")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Field Full_name is not valid UTF-8");
    }

    #[actix_web::test]
    async fn malformed_json_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .insert_header(header::ContentType::json())
            .set_payload(r#"{"Full_name": "Ada","#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON body"));
    }

    #[actix_web::test]
    async fn oversized_json_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app(dir.path())).await;

        let mut payload = ada("ada@x.com", "IT");
        payload["position"] = json!("x".repeat(MAX_JSON_BYTES));
        let req = test::TestRequest::post().uri("/employees").set_json(payload).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Request body too large");
    }

    #[actix_web::test]
    async fn oversized_upload_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(test_app_with_upload_limit(dir.path(), PNG.len() - 1)).await;

        let req = multipart_request(
            test::TestRequest::post().uri("/employees"),
            &[("Full_name", "A"), ("position", "P"), ("department", "IT"), ("email", "a@x.com")],
            Some(PNG),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().starts_with("File size exceeds"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let req = test::TestRequest::get().uri("/employees").to_request();
        let list: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert!(list.is_empty());
    }
}
