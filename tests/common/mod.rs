#![allow(dead_code)]

use blogly::db::init_schema;
use blogly::entity::{post_tag, tag, user};
use blogly::store::{self, PostForm, TagForm, UserForm};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait};

/// Fresh in-memory database. One pooled connection so every query sees the
/// same sqlite memory instance.
pub async fn memory_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect sqlite");
    init_schema(&db).await.expect("init schema");
    db
}

pub async fn seed_user(db: &DatabaseConnection, first_name: &str, last_name: &str) -> user::Model {
    store::create_user(
        db,
        UserForm {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            image_url: None,
        },
    )
    .await
    .expect("create user")
}

pub async fn seed_tag(db: &DatabaseConnection, name: &str) -> tag::Model {
    store::create_tag(
        db,
        TagForm {
            name: name.to_string(),
        },
    )
    .await
    .expect("create tag")
}

pub async fn seed_post(db: &DatabaseConnection, user_id: i32, title: &str, tag_ids: Vec<i32>) -> i32 {
    store::create_post(
        db,
        user_id,
        PostForm {
            title: title.to_string(),
            content: format!("{} body", title),
            tag_ids,
        },
    )
    .await
    .expect("create post")
    .post
    .id
}

pub async fn tag_names(db: &DatabaseConnection, post_id: i32) -> Vec<String> {
    blogly::association::post_tags(db, post_id)
        .await
        .expect("post tags")
        .into_iter()
        .map(|t| t.name)
        .collect()
}

pub async fn association_rows(db: &DatabaseConnection) -> Vec<(i32, i32)> {
    let mut rows: Vec<(i32, i32)> = post_tag::Entity::find()
        .all(db)
        .await
        .expect("post tags")
        .into_iter()
        .map(|row| (row.post_id, row.tag_id))
        .collect();
    rows.sort();
    rows
}
