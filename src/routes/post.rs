use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::cascade;
use crate::entity::user;
use crate::error::AppError;
use crate::response::ResponseDto;
use crate::routes::{
    required, required_verbatim, to_post_dto, to_tag_dto, to_user_dto, PostDto, TagDto, UserDto,
};
use crate::store::{self, PostForm, PostWithTags};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/recent").route(web::get().to(recent_posts)))
        .service(web::resource("/{id:\\d+}").route(web::get().to(show_post)))
        .service(web::resource("/{id:\\d+}/edit").route(web::post().to(update_post)))
        .service(web::resource("/{id:\\d+}/delete").route(web::post().to(delete_post)));
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostRequest {
    title: Option<String>,
    content: Option<String>,
    tag_ids: Option<Vec<i32>>,
}

impl PostRequest {
    pub(crate) fn into_form(self) -> Result<PostForm, AppError> {
        Ok(PostForm {
            title: required("title", self.title.as_deref())?,
            content: required_verbatim("content", self.content)?,
            tag_ids: self.tag_ids.unwrap_or_default(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostDetailDto {
    #[serde(flatten)]
    post: PostDto,
    author: UserDto,
    tags: Vec<TagDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentPostDto {
    #[serde(flatten)]
    post: PostDto,
    author_name: Option<String>,
}

async fn recent_posts(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let posts = store::recent_posts(db.get_ref()).await?;
    let user_ids: Vec<i32> = posts.iter().map(|p| p.user_id).collect();
    let authors: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(|u| (u.id, u.full_name()))
        .collect();

    let list: Vec<RecentPostDto> = posts
        .into_iter()
        .map(|p| RecentPostDto {
            author_name: authors.get(&p.user_id).cloned(),
            post: to_post_dto(p),
        })
        .collect();
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(list))))
}

async fn show_post(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let detail = store::get_post_with_tags(db.get_ref(), path.into_inner()).await?;
    let dto = to_detail_dto(db.get_ref(), detail).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(dto))))
}

async fn update_post(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    payload: web::Json<PostRequest>,
) -> Result<HttpResponse, AppError> {
    let form = payload.into_inner().into_form()?;
    let updated = store::update_post(db.get_ref(), path.into_inner(), form).await?;
    let dto = to_detail_dto(db.get_ref(), updated).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(dto))))
}

async fn delete_post(
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let post = cascade::delete_post(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ResponseDto::success(Some(to_post_dto(post)))))
}

async fn to_detail_dto(
    db: &DatabaseConnection,
    detail: PostWithTags,
) -> Result<PostDetailDto, AppError> {
    let author = store::get_user(db, detail.post.user_id).await?;
    Ok(PostDetailDto {
        post: to_post_dto(detail.post),
        author: to_user_dto(author),
        tags: detail.tags.into_iter().map(to_tag_dto).collect(),
    })
}
