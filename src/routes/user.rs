use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::cascade;
use crate::error::AppError;
use crate::response::ResponseDto;
use crate::routes::{
    max_chars, post::PostRequest, required, to_post_dto, to_tag_dto, to_user_dto, PostDto, TagDto,
    UserDto, NAME_MAX_LEN,
};
use crate::store::{self, UserForm};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(list_users)))
        .service(web::resource("/new").route(web::post().to(add_user)))
        .service(web::resource("/{id:\\d+}").route(web::get().to(show_user)))
        .service(web::resource("/{id:\\d+}/edit").route(web::post().to(edit_user)))
        .service(web::resource("/{id:\\d+}/delete").route(web::post().to(delete_user)))
        .service(web::resource("/{id:\\d+}/posts/new").route(web::post().to(add_post)));
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
}

impl UserRequest {
    fn into_form(self) -> Result<UserForm, AppError> {
        let first_name = required("first_name", self.first_name.as_deref())?;
        let last_name = required("last_name", self.last_name.as_deref())?;
        Ok(UserForm {
            first_name: max_chars("first_name", first_name, NAME_MAX_LEN)?,
            last_name: max_chars("last_name", last_name, NAME_MAX_LEN)?,
            image_url: self.image_url,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserDetailDto {
    #[serde(flatten)]
    user: UserDto,
    posts: Vec<PostDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPostDto {
    #[serde(flatten)]
    post: PostDto,
    tags: Vec<TagDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeletedUserDto {
    id: i32,
    post_ids: Vec<i32>,
}

async fn list_users(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let users = store::list_users(db.get_ref()).await?;
    let list: Vec<UserDto> = users.into_iter().map(to_user_dto).collect();
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}

async fn add_user(
    db: web::Data<DatabaseConnection>,
    payload: web::Json<UserRequest>,
) -> Result<HttpResponse, AppError> {
    let form = payload.into_inner().into_form()?;
    let user = store::create_user(db.get_ref(), form).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(to_user_dto(user)))))
}

async fn show_user(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let detail = store::get_user_with_posts(db.get_ref(), path.into_inner()).await?;
    let dto = UserDetailDto {
        user: to_user_dto(detail.user),
        posts: detail.posts.into_iter().map(to_post_dto).collect(),
    };
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(dto))))
}

async fn edit_user(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    payload: web::Json<UserRequest>,
) -> Result<HttpResponse, AppError> {
    let form = payload.into_inner().into_form()?;
    let user = store::update_user(db.get_ref(), path.into_inner(), form).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(to_user_dto(user)))))
}

async fn delete_user(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let deleted = cascade::delete_user(db.get_ref(), path.into_inner()).await?;
    let dto = DeletedUserDto {
        id: deleted.user.id,
        post_ids: deleted.post_ids,
    };
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(dto))))
}

async fn add_post(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    payload: web::Json<PostRequest>,
) -> Result<HttpResponse, AppError> {
    let form = payload.into_inner().into_form()?;
    let created = store::create_post(db.get_ref(), path.into_inner(), form).await?;
    let dto = CreatedPostDto {
        post: to_post_dto(created.post),
        tags: created.tags.into_iter().map(to_tag_dto).collect(),
    };
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(dto))))
}
