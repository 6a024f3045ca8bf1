use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // One favorite per (user, url); duplicate inserts are resolved by the store.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_favorites_user_url ON favorites(user_id, youtube_url)",
        )
        .await?;

        // One library entry per (user, file); playlist deduplication relies on it.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_downloads_user_filename ON downloads(user_id, filename)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_history_user_played ON history(user_id, played_at)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_playlists_user_created ON playlists(user_id, created_at)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for index in [
            "idx_playlists_user_created",
            "idx_history_user_played",
            "idx_downloads_user_filename",
            "idx_favorites_user_url",
        ] {
            conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {index}"))
                .await?;
        }

        Ok(())
    }
}
