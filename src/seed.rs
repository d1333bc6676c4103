//! Startup seeding of the administrator account and sample items
//!
//! Seed data goes through the same validators as API input, so a bad seed
//! file fails startup instead of producing records the API would reject.

use crate::config::{SeedAdmin, SeedConfig, SeedItem};
use crate::core::entity::NewUser;
use crate::core::field::ProposedFields;
use crate::core::mutation::{MutationKind, fields};
use crate::core::principal::Role;
use crate::core::validation::ItemMode;
use crate::server::host::ServerHost;
use anyhow::{Context, Result};

/// Create the configured admin and sample items when missing
pub async fn run(host: &ServerHost, seed: &SeedConfig) -> Result<()> {
    if let Some(admin) = &seed.admin {
        seed_admin(host, admin).await?;
    }

    if seed.items.is_empty() {
        return Ok(());
    }
    if host.items.count().await? > 0 {
        tracing::debug!("item store not empty, skipping sample items");
        return Ok(());
    }
    for item in &seed.items {
        seed_item(host, item)
            .await
            .with_context(|| format!("seeding item '{}'", item.name))?;
    }
    tracing::info!(count = seed.items.len(), "sample items seeded");
    Ok(())
}

async fn seed_admin(host: &ServerHost, admin: &SeedAdmin) -> Result<()> {
    if host.users.get_by_username(admin.username.trim()).await?.is_some() {
        tracing::debug!(username = %admin.username, "admin account already present");
        return Ok(());
    }

    let mut proposed = ProposedFields::new()
        .with(fields::USERNAME, admin.username.as_str())
        .with(fields::PASSWORD, admin.password.as_str())
        .with(fields::ROLE, Role::Admin.as_str());
    if let Some(email) = &admin.email {
        proposed.insert(fields::EMAIL, email.as_str());
    }

    let changes = host
        .user_validator
        .validate_fields(&proposed, MutationKind::CreateUser)
        .context("seed admin is invalid")?;
    let (Some(username), Some(password)) = (changes.username, changes.password) else {
        anyhow::bail!("seed admin is missing username or password");
    };

    let password_hash = host.hash_password(password).await?;
    let user = host
        .users
        .create(NewUser {
            username,
            email: changes.email,
            password_hash,
            role: Role::Admin,
        })
        .await?;

    tracing::info!(user = user.id, username = %user.username, "admin account seeded");
    Ok(())
}

async fn seed_item(host: &ServerHost, item: &SeedItem) -> Result<()> {
    let proposed = ProposedFields::new()
        .with(fields::NAME, item.name.as_str())
        .with(fields::DESCRIPTION, item.description.as_str())
        .with(fields::QUANTITY, item.quantity)
        .with(fields::PRICE, item.price);

    let new_item = host
        .item_validator
        .validate_fields(&proposed, &ItemMode::Create)?
        .into_new_item()?;
    host.items.create(new_item).await?;
    Ok(())
}
