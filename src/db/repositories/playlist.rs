use crate::entities::{playlists, prelude::*};
use crate::models::MediaRef;
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

pub struct PlaylistRepository {
    conn: DatabaseConnection,
}

impl PlaylistRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Bookmarks a source URL under `name`. `media.title` is not stored.
    pub async fn create(&self, user_id: i32, name: &str, media: &MediaRef) -> Result<i32> {
        let active_model = playlists::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            youtube_url: Set(media.youtube_url.clone()),
            video_id: Set(media.video_id.clone()),
            playlist_id: Set(media.playlist_id.clone()),
            thumbnail: Set(media.thumbnail.clone()),
            created_at: Set(crate::db::now_timestamp()),
            ..Default::default()
        };

        let result = Playlists::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<PlaylistEntry>> {
        let rows = Playlists::find()
            .filter(playlists::Column::UserId.eq(user_id))
            .order_by_desc(playlists::Column::CreatedAt)
            .order_by_desc(playlists::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(PlaylistEntry::from).collect())
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let result = Playlists::delete_many()
            .filter(playlists::Column::Id.eq(id))
            .filter(playlists::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Playlists::find().count(&self.conn).await?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistEntry {
    pub id: i32,
    pub name: String,
    pub youtube_url: String,
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
    pub thumbnail: Option<String>,
    pub created_at: String,
}

impl From<playlists::Model> for PlaylistEntry {
    fn from(p: playlists::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            youtube_url: p.youtube_url,
            video_id: p.video_id,
            playlist_id: p.playlist_id,
            thumbnail: p.thumbnail,
            created_at: p.created_at,
        }
    }
}
