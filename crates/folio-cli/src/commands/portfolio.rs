use anyhow::{Context, Result, anyhow};
use folio_core::{
    Edit, EditorSession, PortfolioConfiguration, SectionKind, SectionTemplate, VersionSummary,
};
use folio_storage::Storage;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Owner-scoped command context
pub struct OwnerContext<'a> {
    pub storage: &'a Storage,
    pub owner: String,
    pub history_limit: usize,
}

impl OwnerContext<'_> {
    /// Editor session seeded with the owner's current configuration
    async fn open_session(&self) -> Result<EditorSession> {
        let current = self.storage.get_current_configuration(&self.owner).await?;
        let mut session =
            EditorSession::with_history_limit(PortfolioConfiguration::default(), self.history_limit);
        match current.version_id {
            Some(version_id) => session.load_version(current.config, version_id),
            None => session.load_snapshot(current.config),
        }
        Ok(session)
    }

    /// Persist the session's working copy as a new version
    async fn save_session(
        &self,
        session: &mut EditorSession,
        label: Option<String>,
    ) -> Result<VersionSummary> {
        let saved = session.config().clone();
        let summary = self
            .storage
            .save_configuration(&self.owner, &saved, label)
            .await?;
        session.mark_saved(summary.id.clone(), &saved);
        Ok(summary)
    }
}

pub async fn show(ctx: &OwnerContext<'_>) -> Result<()> {
    let current = ctx.storage.get_current_configuration(&ctx.owner).await?;

    println!("Owner: {}", ctx.owner);
    match &current.version_id {
        Some(id) => println!("  Version: {}", id),
        None => println!("  Version: (never saved)"),
    }
    if let Some(updated_at) = current.updated_at {
        println!("  Updated: {}", updated_at);
    }
    println!("  Published: {}", if current.published { "yes" } else { "no" });
    println!("  Sections: {}", current.config.sections.len());
    for section in &current.config.sections {
        let mut flags = Vec::new();
        if !section.visible {
            flags.push("hidden");
        }
        if section.locked {
            flags.push("locked");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("    {} {} ({}){}", section.id, section.name, section.kind, flags);
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&current.config)?);

    Ok(())
}

pub async fn versions(ctx: &OwnerContext<'_>) -> Result<()> {
    let versions = ctx.storage.list_versions(&ctx.owner).await?;

    if versions.is_empty() {
        println!("No versions found.");
        return Ok(());
    }

    println!("Versions:");
    for version in versions {
        println!("  {} ({})", version.name, version.id);
        println!("    Created: {}", version.created_at);
    }

    Ok(())
}

pub async fn restore(ctx: &OwnerContext<'_>, version_id: String) -> Result<()> {
    let config = ctx.storage.restore_version(&ctx.owner, &version_id).await?;

    println!("✓ Restored version {}", version_id);
    println!("  Sections: {}", config.sections.len());

    Ok(())
}

pub async fn publish(ctx: &OwnerContext<'_>) -> Result<()> {
    let url = ctx.storage.publish(&ctx.owner).await?;

    println!("✓ Published portfolio");
    println!("  URL: {}", url);

    Ok(())
}

pub async fn import(ctx: &OwnerContext<'_>, file: PathBuf, label: Option<String>) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut session = ctx.open_session().await?;
    session.import_json(&text)?;
    let summary = ctx.save_session(&mut session, label).await?;

    println!("✓ Imported {}", file.display());
    print_summary(&summary);

    Ok(())
}

pub async fn export(ctx: &OwnerContext<'_>, file: Option<PathBuf>) -> Result<()> {
    let session = ctx.open_session().await?;
    let json = session.export_json()?;

    match file {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Exported to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

pub async fn edit(
    ctx: &OwnerContext<'_>,
    file: PathBuf,
    label: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let edits = read_edits(&file)?;

    let mut session = ctx.open_session().await?;
    let applied = apply_edits(&mut session, edits)?;

    if dry_run {
        println!("{}", session.export_json()?);
        return Ok(());
    }

    if !session.is_dirty() {
        println!("No changes to save.");
        return Ok(());
    }

    let summary = ctx.save_session(&mut session, label).await?;
    println!("✓ Applied {} edit(s)", applied);
    print_summary(&summary);

    Ok(())
}

pub async fn add_section(
    ctx: &OwnerContext<'_>,
    kind: String,
    name: Option<String>,
    label: Option<String>,
) -> Result<()> {
    let kind: SectionKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    let mut template = SectionTemplate::for_kind(kind);
    if let Some(name) = name {
        template = template.with_name(name);
    }

    let mut session = ctx.open_session().await?;
    let id = session.add_section(&template);
    let summary = ctx.save_session(&mut session, label).await?;

    println!("✓ Added section: {} ({})", template.name, id);
    print_summary(&summary);

    Ok(())
}

pub fn templates() -> Result<()> {
    println!("Section templates:");
    for template in SectionTemplate::catalog() {
        println!("  {:<16} {}", template.kind.as_str(), template.name);
        if !template.settings.is_empty() {
            println!("    Settings: {}", serde_json::to_string(&template.settings)?);
        }
    }

    Ok(())
}

fn read_edits(path: &Path) -> Result<Vec<Edit>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid edits in {}", path.display()))
}

/// Apply edits in order, stopping at the first failure. Returns the count applied.
fn apply_edits(session: &mut EditorSession, edits: Vec<Edit>) -> Result<usize> {
    let total = edits.len();
    for (index, edit) in edits.into_iter().enumerate() {
        let name = edit.name();
        session
            .apply(edit)
            .with_context(|| format!("Edit {} of {} ({}) failed", index + 1, total, name))?;
        debug!(edit = name, "Applied edit");
    }
    Ok(total)
}

fn print_summary(summary: &VersionSummary) {
    println!("  Version: {} ({})", summary.name, summary.id);
    println!("  Hash: {}", summary.content_hash);
}
