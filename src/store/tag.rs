use log::info;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entity::{post, tag};
use crate::error::{map_tx_error, AppError};

#[derive(Clone, Debug)]
pub struct TagForm {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct TagWithPosts {
    pub tag: tag::Model,
    pub posts: Vec<post::Model>,
}

pub async fn create_tag<C: TransactionTrait>(db: &C, form: TagForm) -> Result<tag::Model, AppError> {
    let tag = db
        .transaction::<_, tag::Model, AppError>(move |txn| {
            Box::pin(async move {
                ensure_name_free(txn, &form.name, None).await?;
                let active = tag::ActiveModel {
                    name: Set(form.name),
                    ..Default::default()
                };
                Ok(active.insert(txn).await?)
            })
        })
        .await
        .map_err(map_tx_error)?;
    info!("tag created id={} name={}", tag.id, tag.name);
    Ok(tag)
}

pub async fn get_tag<C: ConnectionTrait>(db: &C, id: i32) -> Result<tag::Model, AppError> {
    tag::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("tag", id))
}

pub async fn list_tags<C: ConnectionTrait>(db: &C) -> Result<Vec<tag::Model>, AppError> {
    Ok(tag::Entity::find()
        .order_by_asc(tag::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_tag_with_posts<C: ConnectionTrait>(db: &C, id: i32) -> Result<TagWithPosts, AppError> {
    let tag = get_tag(db, id).await?;
    let posts = tag
        .find_related(post::Entity)
        .order_by_asc(post::Column::Id)
        .all(db)
        .await?;
    Ok(TagWithPosts { tag, posts })
}

/// Renames a tag. The new name must not belong to another tag.
pub async fn update_tag<C: TransactionTrait>(
    db: &C,
    id: i32,
    form: TagForm,
) -> Result<tag::Model, AppError> {
    let tag = db
        .transaction::<_, tag::Model, AppError>(move |txn| {
            Box::pin(async move {
                let existing = get_tag(txn, id).await?;
                ensure_name_free(txn, &form.name, Some(existing.id)).await?;
                let mut active: tag::ActiveModel = existing.into();
                active.name = Set(form.name);
                Ok(active.update(txn).await?)
            })
        })
        .await
        .map_err(map_tx_error)?;
    info!("tag updated id={} name={}", tag.id, tag.name);
    Ok(tag)
}

async fn ensure_name_free<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except_id: Option<i32>,
) -> Result<(), AppError> {
    let mut query = tag::Entity::find().filter(tag::Column::Name.eq(name));
    if let Some(id) = except_id {
        query = query.filter(tag::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(AppError::constraint(format!("tag name '{}' already exists", name)));
    }
    Ok(())
}
