//! Handlers for the `profile` subcommands.

use super::Session;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use taskdeck::config::DeckConfig;
use taskdeck::engine::db::Db;
use taskdeck::engine::repo::{ProfileRepo, TaskRepo};
use taskdeck::engine::types::{Avatar, Language, NewProfile};

#[derive(Serialize)]
struct ProfileView {
    id: i64,
    name: String,
    email: String,
    phone: String,
    language: Language,
    avatar: Option<String>,
    tasks: usize,
}

/// Registers a profile and makes it active.
///
/// # Errors
/// Returns error if validation fails or the email is taken.
pub fn create(config: &DeckConfig, name: &str, email: &str, phone: &str) -> Result<()> {
    let conn = Db::connect(&config.storage.dir)?;
    let tx = conn.unchecked_transaction()?;
    let repo = ProfileRepo::new(&tx);

    let profile = repo.create(&NewProfile {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
    })?;
    repo.set_active(profile.id)?;
    tx.commit()?;

    println!(
        "{} Created profile {} <{}> (active)",
        "✓".green(),
        profile.name.yellow(),
        profile.email
    );
    Ok(())
}

/// Switches the active profile by email.
///
/// # Errors
/// Returns error if no profile has that email.
pub fn switch(config: &DeckConfig, email: &str) -> Result<()> {
    let conn = Db::connect(&config.storage.dir)?;
    let repo = ProfileRepo::new(&conn);
    let profile = repo
        .find_by_email(email)?
        .with_context(|| format!("No profile with email '{email}'"))?;
    repo.set_active(profile.id)?;
    println!("{} Now using {} <{}>", "→".yellow(), profile.name.yellow(), profile.email);
    Ok(())
}

/// Lists all profiles, marking the active one.
///
/// # Errors
/// Returns error if the database query fails.
pub fn list(config: &DeckConfig) -> Result<()> {
    let conn = Db::connect(&config.storage.dir)?;
    let repo = ProfileRepo::new(&conn);
    let active = repo.active_id()?;

    println!("{} Profiles:", "👤".cyan());
    let profiles = repo.get_all()?;
    if profiles.is_empty() {
        println!("   (none yet; run `taskdeck profile create`)");
    }
    for p in profiles {
        let marker = if Some(p.id) == active { "*".green() } else { " ".normal() };
        println!("   {marker} {} <{}> [{}]", p.name, p.email, p.language.to_string().dimmed());
    }
    Ok(())
}

/// Shows the active profile.
///
/// # Errors
/// Returns error if no profile is active.
pub fn show(config: &DeckConfig, json: bool) -> Result<()> {
    let Session { conn, profile } = Session::open(config)?;
    let counts = TaskRepo::new(&conn, profile.id).counts()?;

    if json {
        let view = ProfileView {
            id: profile.id,
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            language: profile.language,
            avatar: profile.avatar.as_ref().map(Avatar::data_uri),
            tasks: counts.total,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{} {} <{}>", "👤".cyan(), profile.name.bold(), profile.email);
    println!("   Phone:    {}", profile.phone);
    println!("   Language: {}", profile.language);
    let avatar = profile.avatar.as_ref().map_or_else(
        || "none".to_string(),
        |a| format!("{} ({} bytes)", a.image_type.mime(), a.data.len()),
    );
    println!("   Avatar:   {}", avatar.dimmed());
    println!(
        "   Tasks:    {} total, {} active, {} completed",
        counts.total, counts.active, counts.completed
    );
    Ok(())
}

/// Renames the active profile.
///
/// # Errors
/// Returns error if the name is blank or no profile is active.
pub fn rename(config: &DeckConfig, name: &str) -> Result<()> {
    let session = Session::open(config)?;
    let updated = ProfileRepo::new(&session.conn).rename(session.profile.id, name)?;
    println!("{} Name updated to {}", "✓".green(), updated.name.yellow());
    Ok(())
}

/// Sets the display language of the active profile.
///
/// # Errors
/// Returns error if no profile is active.
pub fn language(config: &DeckConfig, language: Language) -> Result<()> {
    let session = Session::open(config)?;
    ProfileRepo::new(&session.conn).set_language(session.profile.id, language)?;
    println!("{} Language set to {}", "✓".green(), language.to_string().yellow());
    Ok(())
}

/// Sets the avatar from an image file, or removes it.
///
/// # Errors
/// Returns error if the file is unreadable, too large, or not JPEG/PNG.
pub fn avatar(config: &DeckConfig, path: Option<&Path>, clear: bool) -> Result<()> {
    let session = Session::open(config)?;
    let repo = ProfileRepo::new(&session.conn);
    let id = session.profile.id;

    if clear {
        repo.clear_avatar(id)?;
        println!("{} Avatar removed", "✓".green());
        return Ok(());
    }

    let Some(path) = path else {
        anyhow::bail!("Pass an image path or --clear");
    };
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let avatar = Avatar::from_bytes(bytes)?;
    repo.set_avatar(id, &avatar)?;
    println!("{} Avatar updated ({})", "✓".green(), avatar.image_type.mime());
    Ok(())
}
