use actix_web::{
    post,
    web::{Data, ServiceConfig},
    HttpResponse,
};

use super::service::CalendarSyncEngine;
use crate::api::error::ServiceError;

#[post("/sync-calendar")]
async fn sync_calendar(engine: Data<CalendarSyncEngine>) -> Result<HttpResponse, ServiceError> {
    let summary = engine.sync_to_calendar().await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub fn calendar_config(config: &mut ServiceConfig) {
    config.service(sync_calendar);
}
