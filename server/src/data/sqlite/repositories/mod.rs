//! SQLite repositories
//!
//! Types (UserRecord, MicropostRow, etc.) should be imported from `crate::data::types`.

pub mod category;
pub mod comment;
pub mod follow;
pub mod like;
pub mod micropost;
pub mod role;
pub mod user;
pub mod view;

pub use category::{
    categories_for, category_ranking, create_category, find_categories, get_category,
    list_categories,
};
pub use comment::{create_comment, delete_comment, get_comment, list_comments, update_comment};
pub use follow::{
    follow_user, following_ids, is_following, list_followers, list_following, unfollow_user,
};
pub use like::{create_like, delete_like, has_liked};
pub use micropost::{
    create_micropost, get_micropost, list_for_category as list_microposts_for_category,
    list_for_user as list_microposts_for_user, list_microposts, top_liked, top_viewed,
};
pub use role::{find_roles_by_name, get_user_roles, list_roles, set_user_roles};
pub use user::{create_user, get_by_email, get_user, list_users, set_avatar_path};
pub use view::record_view;
