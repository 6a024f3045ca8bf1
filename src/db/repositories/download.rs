use crate::entities::{downloads, prelude::*};
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

pub struct DownloadRepository {
    conn: DatabaseConnection,
}

impl DownloadRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(d: downloads::Model) -> DownloadEntry {
        DownloadEntry {
            id: d.id,
            user_id: d.user_id,
            title: d.title,
            youtube_url: d.youtube_url,
            filename: d.filename,
            downloaded_at: d.downloaded_at,
        }
    }

    /// Records a finished download. Returns `false` if the owner already has
    /// a row for this filename (the unique index resolves concurrent inserts).
    pub async fn record(
        &self,
        user_id: i32,
        title: &str,
        youtube_url: &str,
        filename: &str,
    ) -> Result<bool> {
        let active_model = downloads::ActiveModel {
            user_id: Set(user_id),
            title: Set(title.to_string()),
            youtube_url: Set(youtube_url.to_string()),
            filename: Set(filename.to_string()),
            downloaded_at: Set(crate::db::now_timestamp()),
            ..Default::default()
        };

        let inserted = Downloads::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    downloads::Column::UserId,
                    downloads::Column::Filename,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(inserted > 0)
    }

    pub async fn exists_for_user(&self, user_id: i32, filename: &str) -> Result<bool> {
        let count = Downloads::find()
            .filter(downloads::Column::UserId.eq(user_id))
            .filter(downloads::Column::Filename.eq(filename))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<DownloadEntry>> {
        let rows = Downloads::find()
            .filter(downloads::Column::UserId.eq(user_id))
            .order_by_desc(downloads::Column::DownloadedAt)
            .order_by_desc(downloads::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn delete_for_user(&self, user_id: i32, filename: &str) -> Result<bool> {
        let result = Downloads::delete_many()
            .filter(downloads::Column::UserId.eq(user_id))
            .filter(downloads::Column::Filename.eq(filename))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Number of rows, across all owners, that point at a library file.
    pub async fn count_referencing(&self, filename: &str) -> Result<u64> {
        Ok(Downloads::find()
            .filter(downloads::Column::Filename.eq(filename))
            .count(&self.conn)
            .await?)
    }

    pub async fn list_all_with_owner(&self) -> Result<Vec<OwnedDownload>> {
        let rows = Downloads::find()
            .find_also_related(Users)
            .order_by_desc(downloads::Column::DownloadedAt)
            .order_by_desc(downloads::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(download, user)| OwnedDownload {
                username: user.map(|u| u.username),
                download: Self::map_model(download),
            })
            .collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Downloads::find().count(&self.conn).await?)
    }

    pub async fn count_since(&self, since: &str) -> Result<u64> {
        Ok(Downloads::find()
            .filter(downloads::Column::DownloadedAt.gte(since))
            .count(&self.conn)
            .await?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadEntry {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub youtube_url: String,
    pub filename: String,
    pub downloaded_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnedDownload {
    #[serde(flatten)]
    pub download: DownloadEntry,
    pub username: Option<String>,
}
