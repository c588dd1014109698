use actix_web::web;
use chrono::SecondsFormat;
use serde::Serialize;

use crate::entity;
use crate::error::AppError;
use crate::response::{json_error_handler, path_error_handler};

pub mod post;
pub mod tag;
pub mod user;

/// Longest accepted first or last name.
pub const NAME_MAX_LEN: usize = 20;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(
            web::scope("/api")
                .service(web::scope("/users").configure(user::config))
                .service(web::scope("/posts").configure(post::config))
                .service(web::scope("/tags").configure(tag::config)),
        );
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    id: i32,
    first_name: String,
    last_name: String,
    full_name: String,
    image_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    id: i32,
    title: String,
    content: String,
    created_at: String,
    friendly_date: String,
    user_id: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDto {
    id: i32,
    name: String,
}

pub fn to_user_dto(model: entity::user::Model) -> UserDto {
    UserDto {
        id: model.id,
        full_name: model.full_name(),
        first_name: model.first_name,
        last_name: model.last_name,
        image_url: model.image_url,
    }
}

pub fn to_post_dto(model: entity::post::Model) -> PostDto {
    PostDto {
        id: model.id,
        friendly_date: model.friendly_date(),
        created_at: model.created_at.to_rfc3339_opts(SecondsFormat::Millis, false),
        title: model.title,
        content: model.content,
        user_id: model.user_id,
    }
}

pub fn to_tag_dto(model: entity::tag::Model) -> TagDto {
    TagDto {
        id: model.id,
        name: model.name,
    }
}

/// Trimmed value of a required text field.
pub(crate) fn required(field: &str, value: Option<&str>) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::param_error(format!("{} cannot be empty", field))),
    }
}

/// Required free text kept exactly as typed; only an all-blank value is rejected.
pub(crate) fn required_verbatim(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::param_error(format!("{} cannot be empty", field))),
    }
}

pub(crate) fn max_chars(field: &str, value: String, max: usize) -> Result<String, AppError> {
    if value.chars().count() > max {
        return Err(AppError::param_error(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(value)
}
