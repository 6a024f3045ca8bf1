//! Add user command handler

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService};

pub async fn cmd_add_user(
    config: &Config,
    username: &str,
    email: &str,
    password: &str,
    admin: bool,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store.clone(), config.auth.clone(), config.security.clone());

    // Same validation rules as self-service registration.
    let user = match auth.register(username, email, password).await {
        Ok(user) => user,
        Err(e) => {
            println!("✗ {e}");
            return Ok(());
        }
    };

    if admin {
        store.set_user_admin(user.id, true).await?;
    }

    println!(
        "✓ Created {} '{}' <{}> (ID: {})",
        if admin { "admin" } else { "user" },
        user.username,
        user.email,
        user.id
    );

    Ok(())
}
