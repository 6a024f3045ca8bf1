//! List users command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_users(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.list_users_with_counts().await?;

    if users.is_empty() {
        println!("No users yet.");
        println!();
        println!("Add one with: sonora add-user <username> <email> --password <password>");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for summary in users {
        let user = summary.user;
        let role = if user.is_admin { "admin" } else { "user" };
        let last_login = user.last_login.as_deref().unwrap_or("never");

        println!("[{}] {} <{}> ({role})", user.id, user.username, user.email);
        println!(
            "  Downloads: {} | Created: {} | Last login: {last_login}",
            summary.download_count, user.created_at
        );
    }

    Ok(())
}
