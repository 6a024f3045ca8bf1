pub mod download;
pub mod favorite;
pub mod history;
pub mod playlist;
pub mod user;
