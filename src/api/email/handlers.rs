use actix_web::{
    get, post,
    web::{Data, Path, ServiceConfig},
    HttpResponse,
};

use super::service::EmailIngestionPipeline;
use crate::api::error::ServiceError;

#[get("/emails")]
async fn list_emails(
    pipeline: Data<EmailIngestionPipeline>,
) -> Result<HttpResponse, ServiceError> {
    let emails = pipeline.list_emails().await?;
    Ok(HttpResponse::Ok().json(emails))
}

#[post("/sync-emails")]
async fn sync_emails(pipeline: Data<EmailIngestionPipeline>) -> Result<HttpResponse, ServiceError> {
    let summary = pipeline.sync_inbox().await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[post("/create-job-from-email/{id}")]
async fn create_job_from_email(
    pipeline: Data<EmailIngestionPipeline>,
    path: Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let job = pipeline.extract_job_from_email(path.into_inner()).await?;
    Ok(HttpResponse::Created().json(job))
}

pub fn email_config(config: &mut ServiceConfig) {
    config
        .service(list_emails)
        .service(sync_emails)
        .service(create_job_from_email);
}
