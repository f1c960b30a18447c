use actix_web::{
    get, put,
    web::{Data, ServiceConfig},
    HttpResponse,
};
use actix_web_validator::Json;
use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::api::error::ServiceError;
use crate::db::user_repository::UserRepository;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
}

#[get("/user")]
async fn get_user(pool: Data<Pool<Sqlite>>) -> Result<HttpResponse, ServiceError> {
    let user = UserRepository::get(&pool)
        .await?
        .ok_or(ServiceError::NotFound { kind: "User", id: 1 })?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/user")]
async fn update_user(
    pool: Data<Pool<Sqlite>>,
    payload: Json<UpdateUserPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user = UserRepository::upsert(&pool, &payload.name, &payload.email).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub fn user_config(config: &mut ServiceConfig) {
    config.service(get_user).service(update_user);
}
