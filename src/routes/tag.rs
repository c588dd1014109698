use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::cascade;
use crate::error::AppError;
use crate::response::ResponseDto;
use crate::routes::{required, to_post_dto, to_tag_dto, PostDto, TagDto};
use crate::store::{self, TagForm};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(list_tags)))
        .service(web::resource("/new").route(web::post().to(add_tag)))
        .service(web::resource("/{id:\\d+}").route(web::get().to(show_tag)))
        .service(web::resource("/{id:\\d+}/edit").route(web::post().to(edit_tag)))
        .service(web::resource("/{id:\\d+}/delete").route(web::post().to(delete_tag)));
}

#[derive(Deserialize)]
struct TagRequest {
    name: Option<String>,
}

impl TagRequest {
    fn into_form(self) -> Result<TagForm, AppError> {
        Ok(TagForm {
            name: required("name", self.name.as_deref())?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TagDetailDto {
    #[serde(flatten)]
    tag: TagDto,
    posts: Vec<PostDto>,
}

async fn list_tags(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let rows = store::list_tags(db.get_ref()).await?;
    let list = rows.into_iter().map(to_tag_dto).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}

async fn add_tag(
    db: web::Data<DatabaseConnection>,
    payload: web::Json<TagRequest>,
) -> Result<HttpResponse, AppError> {
    let form = payload.into_inner().into_form()?;
    let tag = store::create_tag(db.get_ref(), form).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(to_tag_dto(tag)))))
}

async fn show_tag(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let detail = store::get_tag_with_posts(db.get_ref(), path.into_inner()).await?;
    let dto = TagDetailDto {
        tag: to_tag_dto(detail.tag),
        posts: detail.posts.into_iter().map(to_post_dto).collect(),
    };
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(dto))))
}

async fn edit_tag(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    payload: web::Json<TagRequest>,
) -> Result<HttpResponse, AppError> {
    let form = payload.into_inner().into_form()?;
    let tag = store::update_tag(db.get_ref(), path.into_inner(), form).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(to_tag_dto(tag)))))
}

async fn delete_tag(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let tag = cascade::delete_tag(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(to_tag_dto(tag)))))
}
