use log::info;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryOrder, Set, TransactionTrait,
};

use crate::entity::{post, user, user::DEFAULT_IMAGE_URL};
use crate::error::{map_tx_error, AppError};

#[derive(Clone, Debug)]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub image_url: Option<String>,
}

impl UserForm {
    /// A missing or blank image URL falls back to the placeholder.
    pub fn image_url_or_default(&self) -> String {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_IMAGE_URL)
            .to_string()
    }
}

#[derive(Clone, Debug)]
pub struct UserWithPosts {
    pub user: user::Model,
    pub posts: Vec<post::Model>,
}

pub async fn create_user<C: TransactionTrait>(db: &C, form: UserForm) -> Result<user::Model, AppError> {
    let user = db
        .transaction::<_, user::Model, AppError>(move |txn| {
            Box::pin(async move {
                let active = user::ActiveModel {
                    image_url: Set(form.image_url_or_default()),
                    first_name: Set(form.first_name),
                    last_name: Set(form.last_name),
                    ..Default::default()
                };
                Ok(active.insert(txn).await?)
            })
        })
        .await
        .map_err(map_tx_error)?;
    info!("user created id={}", user.id);
    Ok(user)
}

pub async fn get_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("user", id))
}

pub async fn list_users<C: ConnectionTrait>(db: &C) -> Result<Vec<user::Model>, AppError> {
    Ok(user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_user_with_posts<C: ConnectionTrait>(db: &C, id: i32) -> Result<UserWithPosts, AppError> {
    let user = get_user(db, id).await?;
    let posts = user
        .find_related(post::Entity)
        .order_by_asc(post::Column::Id)
        .all(db)
        .await?;
    Ok(UserWithPosts { user, posts })
}

/// Overwrites all three editable fields.
pub async fn update_user<C: TransactionTrait>(
    db: &C,
    id: i32,
    form: UserForm,
) -> Result<user::Model, AppError> {
    let user = db
        .transaction::<_, user::Model, AppError>(move |txn| {
            Box::pin(async move {
                let existing = get_user(txn, id).await?;
                let mut active: user::ActiveModel = existing.into();
                active.image_url = Set(form.image_url_or_default());
                active.first_name = Set(form.first_name);
                active.last_name = Set(form.last_name);
                Ok(active.update(txn).await?)
            })
        })
        .await
        .map_err(map_tx_error)?;
    info!("user updated id={}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(image_url: Option<&str>) -> UserForm {
        UserForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            image_url: image_url.map(str::to_string),
        }
    }

    #[test]
    fn missing_or_blank_image_uses_placeholder() {
        assert_eq!(form(None).image_url_or_default(), DEFAULT_IMAGE_URL);
        assert_eq!(form(Some("")).image_url_or_default(), DEFAULT_IMAGE_URL);
        assert_eq!(form(Some("   ")).image_url_or_default(), DEFAULT_IMAGE_URL);
    }

    #[test]
    fn supplied_image_is_kept() {
        assert_eq!(
            form(Some(" https://img.example/ada.png ")).image_url_or_default(),
            "https://img.example/ada.png"
        );
    }
}
