mod add_user;
mod list_users;

pub use add_user::cmd_add_user;
pub use list_users::cmd_list_users;
