use actix_web::{
    get, post,
    web::{scope, Data, Path, ServiceConfig},
    HttpResponse,
};
use actix_web_validator::Json;

use super::models::BookEventPayload;
use super::service::EventService;
use crate::api::error::ServiceError;

#[get("")]
async fn list_events(service: Data<EventService>) -> Result<HttpResponse, ServiceError> {
    let events = service.list_events().await?;
    Ok(HttpResponse::Ok().json(events))
}

#[get("/{id}")]
async fn get_event(
    service: Data<EventService>,
    path: Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let event = service.get_event(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(event))
}

#[post("")]
async fn book_event(
    service: Data<EventService>,
    payload: Json<BookEventPayload>,
) -> Result<HttpResponse, ServiceError> {
    let event = service.book_event(&payload).await?;
    Ok(HttpResponse::Created().json(event))
}

pub fn event_config(config: &mut ServiceConfig) {
    config.service(
        scope("/events")
            .service(list_events)
            .service(book_event)
            .service(get_event),
    );
}
