// Public (no auth) → Protected (bearer JWT) → Admin (role check in handler)
pub mod health;
pub mod tools;

pub use health::health;
pub use tools::{
    categories as tool_categories, create as tool_create, delete as tool_delete, list as tool_list,
    tags as tool_tags, update as tool_update,
};
