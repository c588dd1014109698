//! Post/tag association rows.
//!
//! `posts_tags` is only ever written through this module. Edits compute the
//! desired tag set, diff it against what is stored, then delete and insert the
//! difference, so deselecting several tags in one edit removes all of them.

use std::collections::BTreeSet;

use log::debug;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};

use crate::entity::{post, post_tag, tag};
use crate::error::{map_tx_error, AppError};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagDiff {
    pub to_remove: Vec<i32>,
    pub to_add: Vec<i32>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Tags present in `current` but not `desired` are removed, the reverse are
/// added, the intersection is left alone.
pub fn diff_tag_sets(current: &BTreeSet<i32>, desired: &BTreeSet<i32>) -> TagDiff {
    TagDiff {
        to_remove: current.difference(desired).copied().collect(),
        to_add: desired.difference(current).copied().collect(),
    }
}

/// Replaces the full tag set of `post_id` with `tag_ids` (deduplicated).
/// Unknown tag ids are dropped. Returns the resulting tags ordered by name.
pub async fn set_post_tags<C: TransactionTrait>(
    db: &C,
    post_id: i32,
    tag_ids: Vec<i32>,
) -> Result<Vec<tag::Model>, AppError> {
    db.transaction::<_, Vec<tag::Model>, AppError>(move |txn| {
        Box::pin(async move {
            let post = find_post(txn, post_id).await?;
            replace_post_tags(txn, post.id, &tag_ids).await?;
            tags_of(txn, &post).await
        })
    })
    .await
    .map_err(map_tx_error)
}

/// Attaches `tag_ids` to a freshly created post, i.e. a replacement that
/// starts from the empty set. Tags already attached are kept.
pub async fn add_post_tags<C: TransactionTrait>(
    db: &C,
    post_id: i32,
    tag_ids: Vec<i32>,
) -> Result<Vec<tag::Model>, AppError> {
    db.transaction::<_, Vec<tag::Model>, AppError>(move |txn| {
        Box::pin(async move {
            let post = find_post(txn, post_id).await?;
            attach_post_tags(txn, post.id, &tag_ids).await?;
            tags_of(txn, &post).await
        })
    })
    .await
    .map_err(map_tx_error)
}

/// Tags of an existing post, ordered by name.
pub async fn post_tags<C: ConnectionTrait>(db: &C, post_id: i32) -> Result<Vec<tag::Model>, AppError> {
    let post = find_post(db, post_id).await?;
    tags_of(db, &post).await
}

pub(crate) async fn tags_of<C: ConnectionTrait>(
    db: &C,
    post: &post::Model,
) -> Result<Vec<tag::Model>, AppError> {
    Ok(post
        .find_related(tag::Entity)
        .order_by_asc(tag::Column::Name)
        .order_by_asc(tag::Column::Id)
        .all(db)
        .await?)
}

pub(crate) async fn replace_post_tags<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
    tag_ids: &[i32],
) -> Result<TagDiff, AppError> {
    let desired = resolve_tag_ids(db, tag_ids).await?;
    let current = current_tag_ids(db, post_id).await?;
    let diff = diff_tag_sets(&current, &desired);
    apply_diff(db, post_id, &diff).await?;
    Ok(diff)
}

pub(crate) async fn attach_post_tags<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
    tag_ids: &[i32],
) -> Result<TagDiff, AppError> {
    let desired = resolve_tag_ids(db, tag_ids).await?;
    let current = current_tag_ids(db, post_id).await?;
    let diff = TagDiff {
        to_remove: Vec::new(),
        to_add: desired.difference(&current).copied().collect(),
    };
    apply_diff(db, post_id, &diff).await?;
    Ok(diff)
}

/// Removes every association row of the given posts.
pub(crate) async fn detach_posts<C: ConnectionTrait>(db: &C, post_ids: &[i32]) -> Result<u64, AppError> {
    if post_ids.is_empty() {
        return Ok(0);
    }
    let res = post_tag::Entity::delete_many()
        .filter(post_tag::Column::PostId.is_in(post_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

/// Removes every association row pointing at `tag_id`.
pub(crate) async fn detach_tag<C: ConnectionTrait>(db: &C, tag_id: i32) -> Result<u64, AppError> {
    let res = post_tag::Entity::delete_many()
        .filter(post_tag::Column::TagId.eq(tag_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

async fn find_post<C: ConnectionTrait>(db: &C, post_id: i32) -> Result<post::Model, AppError> {
    post::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("post", post_id))
}

async fn current_tag_ids<C: ConnectionTrait>(db: &C, post_id: i32) -> Result<BTreeSet<i32>, AppError> {
    let ids: Vec<i32> = post_tag::Entity::find()
        .select_only()
        .column(post_tag::Column::TagId)
        .filter(post_tag::Column::PostId.eq(post_id))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

async fn resolve_tag_ids<C: ConnectionTrait>(db: &C, tag_ids: &[i32]) -> Result<BTreeSet<i32>, AppError> {
    let requested: BTreeSet<i32> = tag_ids.iter().copied().collect();
    if requested.is_empty() {
        return Ok(requested);
    }
    let known: Vec<i32> = tag::Entity::find()
        .select_only()
        .column(tag::Column::Id)
        .filter(tag::Column::Id.is_in(requested.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;
    let known: BTreeSet<i32> = known.into_iter().collect();
    if known.len() != requested.len() {
        let unknown: Vec<i32> = requested.difference(&known).copied().collect();
        debug!("ignoring unknown tag ids {:?}", unknown);
    }
    Ok(known)
}

async fn apply_diff<C: ConnectionTrait>(db: &C, post_id: i32, diff: &TagDiff) -> Result<(), AppError> {
    if diff.is_empty() {
        return Ok(());
    }
    if !diff.to_remove.is_empty() {
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .filter(post_tag::Column::TagId.is_in(diff.to_remove.iter().copied()))
            .exec(db)
            .await?;
    }
    if !diff.to_add.is_empty() {
        let rows = diff.to_add.iter().map(|tag_id| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(*tag_id),
        });
        post_tag::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await?;
    }
    debug!(
        "post {} tags: removed {:?} added {:?}",
        post_id, diff.to_remove, diff.to_add
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[i32]) -> BTreeSet<i32> {
        ids.iter().copied().collect()
    }

    #[test]
    fn diff_removes_every_deselected_tag() {
        let diff = diff_tag_sets(&set(&[1, 2, 3, 4]), &set(&[2]));
        assert_eq!(diff.to_remove, vec![1, 3, 4]);
        assert!(diff.to_add.is_empty());
    }

    #[test]
    fn diff_keeps_intersection_untouched() {
        let diff = diff_tag_sets(&set(&[1, 2]), &set(&[2, 5]));
        assert_eq!(diff.to_remove, vec![1]);
        assert_eq!(diff.to_add, vec![5]);
    }

    #[test]
    fn diff_to_empty_clears_everything() {
        let diff = diff_tag_sets(&set(&[7, 8]), &BTreeSet::new());
        assert_eq!(diff.to_remove, vec![7, 8]);
        assert!(diff.to_add.is_empty());
    }

    #[test]
    fn identical_sets_produce_no_work() {
        assert!(diff_tag_sets(&set(&[3, 9]), &set(&[9, 3])).is_empty());
    }
}
