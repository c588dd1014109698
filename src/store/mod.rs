//! Create, read and update for users, posts and tags.
//!
//! Every mutating function opens its own transaction on the handle it is
//! given; deletes live in [`crate::cascade`].

pub mod post;
pub mod tag;
pub mod user;

pub use post::{
    create_post, get_post, get_post_with_tags, list_posts_for_user, recent_posts, update_post,
    PostForm, PostWithTags, RECENT_POSTS_LIMIT,
};
pub use tag::{create_tag, get_tag, get_tag_with_posts, list_tags, update_tag, TagForm, TagWithPosts};
pub use user::{create_user, get_user, get_user_with_posts, list_users, update_user, UserForm, UserWithPosts};
