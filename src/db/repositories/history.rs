use crate::entities::{history, prelude::*};
use crate::models::MediaRef;
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;

pub struct HistoryRepository {
    conn: DatabaseConnection,
}

impl HistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, user_id: i32, media: &MediaRef) -> Result<i32> {
        let active_model = history::ActiveModel {
            user_id: Set(user_id),
            title: Set(media.title.clone()),
            youtube_url: Set(media.youtube_url.clone()),
            video_id: Set(media.video_id.clone()),
            playlist_id: Set(media.playlist_id.clone()),
            thumbnail: Set(media.thumbnail.clone()),
            played_at: Set(crate::db::now_timestamp()),
            ..Default::default()
        };

        let result = History::insert(active_model).exec(&self.conn).await?;
        Ok(result.last_insert_id)
    }

    pub async fn list(&self, user_id: i32, limit: u64) -> Result<Vec<HistoryEntry>> {
        let rows = History::find()
            .filter(history::Column::UserId.eq(user_id))
            .order_by_desc(history::Column::PlayedAt)
            .order_by_desc(history::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    pub async fn clear(&self, user_id: i32) -> Result<u64> {
        let result = History::delete_many()
            .filter(history::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(History::find().count(&self.conn).await?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: i32,
    pub title: String,
    pub youtube_url: String,
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
    pub thumbnail: Option<String>,
    pub played_at: String,
}

impl From<history::Model> for HistoryEntry {
    fn from(h: history::Model) -> Self {
        Self {
            id: h.id,
            title: h.title,
            youtube_url: h.youtube_url,
            video_id: h.video_id,
            playlist_id: h.playlist_id,
            thumbnail: h.thumbnail,
            played_at: h.played_at,
        }
    }
}
