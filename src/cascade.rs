//! Deletes with explicit referential cleanup.
//!
//! Each delete runs in one transaction: a user takes its posts and their
//! association rows with it, a post or tag only takes its own association
//! rows. Tags are never removed as a side effect, and neither are posts when a
//! tag goes away.

use log::{debug, info};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait};

use crate::association;
use crate::entity::{post, tag, user};
use crate::error::{map_tx_error, AppError};
use crate::store::{get_post, get_tag, get_user};

#[derive(Clone, Debug)]
pub struct DeletedUser {
    pub user: user::Model,
    pub post_ids: Vec<i32>,
}

pub async fn delete_user<C: TransactionTrait>(db: &C, id: i32) -> Result<DeletedUser, AppError> {
    let deleted = db
        .transaction::<_, DeletedUser, AppError>(move |txn| {
            Box::pin(async move {
                let user = get_user(txn, id).await?;
                let post_ids: Vec<i32> = post::Entity::find()
                    .select_only()
                    .column(post::Column::Id)
                    .filter(post::Column::UserId.eq(user.id))
                    .order_by_asc(post::Column::Id)
                    .into_tuple()
                    .all(txn)
                    .await?;
                association::detach_posts(txn, &post_ids).await?;
                post::Entity::delete_many()
                    .filter(post::Column::UserId.eq(user.id))
                    .exec(txn)
                    .await?;
                user::Entity::delete_by_id(user.id).exec(txn).await?;
                Ok(DeletedUser { user, post_ids })
            })
        })
        .await
        .map_err(map_tx_error)?;
    info!(
        "user deleted id={} posts={:?}",
        deleted.user.id, deleted.post_ids
    );
    Ok(deleted)
}

pub async fn delete_post<C: TransactionTrait>(db: &C, id: i32) -> Result<post::Model, AppError> {
    let post = db
        .transaction::<_, post::Model, AppError>(move |txn| {
            Box::pin(async move {
                let post = get_post(txn, id).await?;
                association::detach_posts(txn, &[post.id]).await?;
                post::Entity::delete_by_id(post.id).exec(txn).await?;
                Ok(post)
            })
        })
        .await
        .map_err(map_tx_error)?;
    info!("post deleted id={} user_id={}", post.id, post.user_id);
    Ok(post)
}

pub async fn delete_tag<C: TransactionTrait>(db: &C, id: i32) -> Result<tag::Model, AppError> {
    let tag = db
        .transaction::<_, tag::Model, AppError>(move |txn| {
            Box::pin(async move {
                let tag = get_tag(txn, id).await?;
                let detached = association::detach_tag(txn, tag.id).await?;
                tag::Entity::delete_by_id(tag.id).exec(txn).await?;
                debug!("tag {} detached from {} posts", tag.id, detached);
                Ok(tag)
            })
        })
        .await
        .map_err(map_tx_error)?;
    info!("tag deleted id={} name={}", tag.id, tag.name);
    Ok(tag)
}
