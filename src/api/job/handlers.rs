use actix_web::{
    delete, get, patch, post, put,
    web::{scope, Data, Path, Query, ServiceConfig},
    HttpResponse,
};
use actix_web_validator::Json;

use super::dto::{ListJobsQuery, SearchQuery};
use super::models::{AnnotatePayload, CreateJobPayload, UpdateStatusPayload};
use super::service::JobService;
use crate::api::error::ServiceError;

#[get("")]
async fn list_jobs(
    service: Data<JobService>,
    query: Query<ListJobsQuery>,
) -> Result<HttpResponse, ServiceError> {
    let jobs = service.list_jobs(&query).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[get("/search")]
async fn search_jobs(
    service: Data<JobService>,
    query: Query<SearchQuery>,
) -> Result<HttpResponse, ServiceError> {
    let jobs = service.search_jobs(&query.term).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[get("/{id}")]
async fn get_job(service: Data<JobService>, path: Path<i64>) -> Result<HttpResponse, ServiceError> {
    let job = service.get_job(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(job))
}

#[post("")]
async fn create_job(
    service: Data<JobService>,
    payload: Json<CreateJobPayload>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.create_job(&payload).await?;
    Ok(HttpResponse::Created().json(job))
}

#[put("/{id}")]
async fn update_status(
    service: Data<JobService>,
    path: Path<i64>,
    payload: Json<UpdateStatusPayload>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.update_status(path.into_inner(), payload.status).await?;
    Ok(HttpResponse::Ok().json(job))
}

#[patch("/{id}")]
async fn annotate_job(
    service: Data<JobService>,
    path: Path<i64>,
    payload: Json<AnnotatePayload>,
) -> Result<HttpResponse, ServiceError> {
    let job = service
        .annotate_job(path.into_inner(), &payload.additional_data)
        .await?;
    Ok(HttpResponse::Ok().json(job))
}

#[delete("/{id}")]
async fn delete_job(
    service: Data<JobService>,
    path: Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    service.delete_job(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn job_config(config: &mut ServiceConfig) {
    // /search must register ahead of /{id}
    config.service(
        scope("/jobs")
            .service(list_jobs)
            .service(search_jobs)
            .service(create_job)
            .service(get_job)
            .service(update_status)
            .service(annotate_job)
            .service(delete_job),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::validation;
    use crate::db::test_pool;
    use actix_web::{test, web, App};

    macro_rules! spawn_app {
        () => {{
            let pool = test_pool().await;
            test::init_service(
                App::new()
                    .app_data(web::Data::new(JobService::new(pool.clone())))
                    .app_data(validation::json_config())
                    .service(web::scope("/api").configure(job_config)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn create_then_fetch_job() {
        let app = spawn_app!();

        let req = test::TestRequest::post()
            .uri("/api/jobs")
            .set_json(serde_json::json!({
                "title": "Fix sink",
                "description": "Kitchen leak",
                "address": "1 Elm St"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["createdAt"], body["updatedAt"]);

        let id = body["id"].as_i64().unwrap();
        let req = test::TestRequest::get()
            .uri(&format!("/api/jobs/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn fetch_unknown_job_is_404() {
        let app = spawn_app!();
        let req = test::TestRequest::get().uri("/api/jobs/99").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn unknown_status_value_is_400() {
        let app = spawn_app!();

        let req = test::TestRequest::post()
            .uri("/api/jobs")
            .set_json(serde_json::json!({"title": "t", "description": "d"}))
            .to_request();
        let created: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/jobs/{}", created["id"]))
            .set_json(serde_json::json!({"status": "done"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn search_endpoint_filters_by_term() {
        let app = spawn_app!();

        for (title, description) in [("Fix sink", "kitchen"), ("Paint fence", "garden")] {
            let req = test::TestRequest::post()
                .uri("/api/jobs")
                .set_json(serde_json::json!({"title": title, "description": description}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 201);
        }

        let req = test::TestRequest::get()
            .uri("/api/jobs/search?term=FENCE")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Vec<serde_json::Value> = test::read_body_json(resp).await;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["title"], "Paint fence");
    }
}
