use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use cc_blocks::collections::{GroupedSessionBlocks, SessionBlocks};
use cc_blocks::config::DatasetConfig;
use cc_blocks::io::{save_grouped, save_session};
use cc_blocks::parsing::Protocol;

fn load_config(path: Option<&str>) -> Result<DatasetConfig> {
    match path {
        Some(path) => DatasetConfig::from_file(path)
            .with_context(|| format!("Failed to load dataset config {}", path)),
        None => DatasetConfig::from_default_location()
            .context("Failed to load dataset config from the default locations"),
    }
}

/// Build every configured session and write it to its directory.
fn make_sessions(config: &DatasetConfig) -> Result<Vec<(String, SessionBlocks)>> {
    let mut built = Vec::with_capacity(config.sessions.len());

    for entry in &config.sessions {
        let protocol_path = config.protocol_path(entry);
        let protocol = Protocol::from_file(&protocol_path)
            .with_context(|| format!("Failed to read protocol {}", protocol_path.display()))?;
        let mut session = protocol
            .build_session()
            .with_context(|| format!("Invalid protocol {}", protocol_path.display()))?;

        if session.session_name() != entry.session_name {
            session = SessionBlocks::new(
                entry.session_name.clone(),
                session.block_sequence().to_vec(),
            );
        }

        let session_dir = config.session_dir(entry);
        fs::create_dir_all(&session_dir)
            .with_context(|| format!("Failed to create {}", session_dir.display()))?;

        let session_file = config.session_file(entry);
        save_session(&session, &session_file)
            .with_context(|| format!("Failed to save session '{}'", entry.session_name))?;

        println!(
            "  {} -> {} ({} blocks, {:.0} s)",
            entry.session_name,
            session_file.display(),
            session.len(),
            session.total_duration()
        );
        built.push((entry.session_name.clone(), session));
    }

    Ok(built)
}

fn save_combined(
    config: &DatasetConfig,
    sessions: Vec<(String, SessionBlocks)>,
) -> Result<Option<PathBuf>> {
    let (Some(grouped_entry), Some(path)) = (config.grouped.as_ref(), config.grouped_file()) else {
        return Ok(None);
    };

    let grouped = GroupedSessionBlocks::from_members(grouped_entry.session_name.clone(), sessions)
        .context("Failed to group sessions")?;
    fs::create_dir_all(&config.root_dir)
        .with_context(|| format!("Failed to create {}", config.root_dir.display()))?;
    save_grouped(&grouped, &path)
        .with_context(|| format!("Failed to save grouped sessions to {}", path.display()))?;

    Ok(Some(path))
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(|s| s.as_str()))?;

    println!("=== Session Builder ===");
    println!("Dataset root: {}", config.root_dir.display());
    println!("Sessions: {}", config.sessions.len());
    println!();

    let sessions = make_sessions(&config)?;

    if let Some(path) = save_combined(&config, sessions)? {
        println!("  grouped -> {}", path.display());
    }

    println!();
    println!("✓ Sessions written successfully!");
    Ok(())
}
