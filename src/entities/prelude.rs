pub use super::downloads::Entity as Downloads;
pub use super::favorites::Entity as Favorites;
pub use super::history::Entity as History;
pub use super::playlists::Entity as Playlists;
pub use super::users::Entity as Users;
