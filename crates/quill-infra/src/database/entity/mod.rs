//! SeaORM entities, one module per table.

pub mod category;
pub mod comment;
pub mod post;
pub mod post_tag;
pub mod tag;
pub mod user;
