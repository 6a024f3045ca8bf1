pub mod prelude;

pub mod downloads;
pub mod favorites;
pub mod history;
pub mod playlists;
pub mod users;
