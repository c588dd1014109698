use chrono::Utc;
use log::info;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::association;
use crate::entity::{post, tag};
use crate::error::{map_tx_error, AppError};
use crate::store::user::get_user;

/// Size of the "recent posts" slice on the home page.
pub const RECENT_POSTS_LIMIT: u64 = 5;

#[derive(Clone, Debug, Default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub tag_ids: Vec<i32>,
}

#[derive(Clone, Debug)]
pub struct PostWithTags {
    pub post: post::Model,
    pub tags: Vec<tag::Model>,
}

pub async fn create_post<C: TransactionTrait>(
    db: &C,
    user_id: i32,
    form: PostForm,
) -> Result<PostWithTags, AppError> {
    let created = db
        .transaction::<_, PostWithTags, AppError>(move |txn| {
            Box::pin(async move {
                let owner = get_user(txn, user_id).await?;
                let active = post::ActiveModel {
                    title: Set(form.title),
                    content: Set(form.content),
                    created_at: Set(Utc::now()),
                    user_id: Set(owner.id),
                    ..Default::default()
                };
                let post = active.insert(txn).await?;
                association::attach_post_tags(txn, post.id, &form.tag_ids).await?;
                let tags = association::tags_of(txn, &post).await?;
                Ok(PostWithTags { post, tags })
            })
        })
        .await
        .map_err(map_tx_error)?;
    info!(
        "post created id={} user_id={}",
        created.post.id, created.post.user_id
    );
    Ok(created)
}

pub async fn get_post<C: ConnectionTrait>(db: &C, id: i32) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("post", id))
}

pub async fn get_post_with_tags<C: ConnectionTrait>(db: &C, id: i32) -> Result<PostWithTags, AppError> {
    let post = get_post(db, id).await?;
    let tags = association::tags_of(db, &post).await?;
    Ok(PostWithTags { post, tags })
}

pub async fn list_posts_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<post::Model>, AppError> {
    let owner = get_user(db, user_id).await?;
    Ok(post::Entity::find()
        .filter(post::Column::UserId.eq(owner.id))
        .order_by_asc(post::Column::Id)
        .all(db)
        .await?)
}

/// Newest first, at most [`RECENT_POSTS_LIMIT`]. Posts created in the same
/// instant fall back to id order.
pub async fn recent_posts<C: ConnectionTrait>(db: &C) -> Result<Vec<post::Model>, AppError> {
    Ok(post::Entity::find()
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
        .limit(RECENT_POSTS_LIMIT)
        .all(db)
        .await?)
}

/// Overwrites title and content and replaces the tag set. Owner and creation
/// time never change.
pub async fn update_post<C: TransactionTrait>(
    db: &C,
    id: i32,
    form: PostForm,
) -> Result<PostWithTags, AppError> {
    let updated = db
        .transaction::<_, PostWithTags, AppError>(move |txn| {
            Box::pin(async move {
                let existing = get_post(txn, id).await?;
                let mut active: post::ActiveModel = existing.into();
                active.title = Set(form.title);
                active.content = Set(form.content);
                let post = active.update(txn).await?;
                association::replace_post_tags(txn, post.id, &form.tag_ids).await?;
                let tags = association::tags_of(txn, &post).await?;
                Ok(PostWithTags { post, tags })
            })
        })
        .await
        .map_err(map_tx_error)?;
    info!("post updated id={}", updated.post.id);
    Ok(updated)
}
