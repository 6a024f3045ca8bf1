use crate::entities::{favorites, prelude::*};
use crate::models::MediaRef;
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

pub struct FavoriteRepository {
    conn: DatabaseConnection,
}

impl FavoriteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Adds a favorite. Returns `false` when the owner already favorited
    /// this URL; the check and the insert are one statement.
    pub async fn add(&self, user_id: i32, media: &MediaRef) -> Result<bool> {
        let active_model = favorites::ActiveModel {
            user_id: Set(user_id),
            title: Set(media.title.clone()),
            youtube_url: Set(media.youtube_url.clone()),
            video_id: Set(media.video_id.clone()),
            playlist_id: Set(media.playlist_id.clone()),
            thumbnail: Set(media.thumbnail.clone()),
            added_at: Set(crate::db::now_timestamp()),
            ..Default::default()
        };

        let inserted = Favorites::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    favorites::Column::UserId,
                    favorites::Column::YoutubeUrl,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(inserted > 0)
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<FavoriteEntry>> {
        let rows = Favorites::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .order_by_desc(favorites::Column::AddedAt)
            .order_by_desc(favorites::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(FavoriteEntry::from).collect())
    }

    /// Deletes by (id, owner); a favorite owned by someone else is reported
    /// exactly like a missing one.
    pub async fn remove(&self, user_id: i32, id: i32) -> Result<bool> {
        let result = Favorites::delete_many()
            .filter(favorites::Column::Id.eq(id))
            .filter(favorites::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Favorites::find().count(&self.conn).await?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteEntry {
    pub id: i32,
    pub title: String,
    pub youtube_url: String,
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
    pub thumbnail: Option<String>,
    pub added_at: String,
}

impl From<favorites::Model> for FavoriteEntry {
    fn from(f: favorites::Model) -> Self {
        Self {
            id: f.id,
            title: f.title,
            youtube_url: f.youtube_url,
            video_id: f.video_id,
            playlist_id: f.playlist_id,
            thumbnail: f.thumbnail,
            added_at: f.added_at,
        }
    }
}
