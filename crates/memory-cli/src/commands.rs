//! Command implementations for the memory binary.
//!
//! Every handler runs against an [`IndexRegistry`] whose project has already
//! been initialized, and writes its report to `out`.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use memory_search::{SearchHits, SearchQuery, TimeRange};
use memory_service::{IndexRegistry, LoadOutcome, NewRecord};
use memory_types::{DocType, Document};

use crate::cli::{Commands, DocumentArgs, SearchArgs};

/// Dispatch a parsed command.
pub fn run_command(
    registry: &IndexRegistry,
    project: &Path,
    command: Commands,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Init => show_init(registry, project, out),
        Commands::Add { content, fields } => add_document(registry, project, content, fields, out),
        Commands::Get { id, json } => show_document(registry, project, &id, json, out),
        Commands::Update {
            id,
            content,
            fields,
        } => update_document(registry, project, &id, content, fields, out),
        Commands::Delete { id } => delete_document(registry, project, &id, out),
        Commands::Search(args) => search(registry, project, args, out),
        Commands::List { doc_type, json } => list_documents(registry, project, doc_type, json, out),
        Commands::Rebuild => rebuild(registry, project, out),
        Commands::Stats { json } => show_stats(registry, project, json, out),
    }
}

fn show_init(registry: &IndexRegistry, project: &Path, out: &mut impl Write) -> Result<()> {
    let message = registry.with_project(project, |index| {
        let path = index.snapshot_path().display();
        Ok(match index.load_outcome() {
            LoadOutcome::Fresh => format!("New index for {} ({})", index.scope(), path),
            LoadOutcome::Restored { documents } => {
                format!("Loaded {} documents from {}", documents, path)
            }
            LoadOutcome::Recovered { reason } => format!(
                "Snapshot at {} was unreadable ({}); starting empty",
                path, reason
            ),
        })
    })?;
    writeln!(out, "{}", message)?;
    Ok(())
}

fn record_from_args(content: String, fields: DocumentArgs) -> NewRecord {
    let mut record = NewRecord::new(fields.doc_type, content)
        .with_tags(fields.tags)
        .with_priority(fields.priority)
        .with_category(fields.category)
        .with_source(fields.source);
    if let Some(title) = fields.title {
        record = record.with_title(title);
    }
    record
}

fn add_document(
    registry: &IndexRegistry,
    project: &Path,
    content: String,
    fields: DocumentArgs,
    out: &mut impl Write,
) -> Result<()> {
    let doc = registry
        .remember(project, record_from_args(content, fields))
        .context("Failed to add document")?;
    writeln!(out, "{}", doc.id)?;
    Ok(())
}

fn update_document(
    registry: &IndexRegistry,
    project: &Path,
    id: &str,
    content: String,
    fields: DocumentArgs,
    out: &mut impl Write,
) -> Result<()> {
    let Some(existing) = registry.get(project, id)? else {
        bail!("No document with id {}", id);
    };

    let mut doc = record_from_args(content, fields)
        .at(existing.timestamp)
        .into_document(existing.project_scope());
    doc.id = existing.id;

    let updated = registry
        .update(project, doc)
        .context("Failed to update document")?;
    if !updated {
        bail!("Document {} was removed concurrently", id);
    }
    writeln!(out, "Updated {}", id)?;
    Ok(())
}

fn delete_document(
    registry: &IndexRegistry,
    project: &Path,
    id: &str,
    out: &mut impl Write,
) -> Result<()> {
    if registry
        .delete(project, id)
        .context("Failed to delete document")?
    {
        writeln!(out, "Deleted {}", id)?;
    } else {
        writeln!(out, "No document with id {}", id)?;
    }
    Ok(())
}

fn show_document(
    registry: &IndexRegistry,
    project: &Path,
    id: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let Some(doc) = registry.get(project, id)? else {
        bail!("No document with id {}", id);
    };
    if json {
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
    } else {
        write_document(&doc, out)?;
    }
    Ok(())
}

/// Parse RFC 3339, or a bare date taken as the start (or end) of that UTC day.
pub fn parse_time_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| {
        format!("Invalid timestamp {:?}, expected RFC 3339 or YYYY-MM-DD", value)
    })?;
    let time = if end_of_day {
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .context("Invalid time of day")?;
    Ok(date.and_time(time).and_utc())
}

/// Build a query from CLI arguments, falling back to `default_limit`.
pub fn build_query(args: &SearchArgs, default_limit: usize) -> Result<SearchQuery> {
    let mut query = SearchQuery::new(args.query.clone())
        .with_limit(args.limit.unwrap_or(default_limit))
        .with_offset(args.offset);
    query.filters.doc_type = args.doc_type;
    query.filters.tags = args.tags.clone();
    query.filters.priority = args.priority;
    query.filters.category = args.category.clone();

    if args.since.is_some() || args.until.is_some() {
        let start = args
            .since
            .as_deref()
            .map(|s| parse_time_bound(s, false))
            .transpose()?;
        let end = args
            .until
            .as_deref()
            .map(|s| parse_time_bound(s, true))
            .transpose()?;
        query.filters.time_range = Some(TimeRange::new(start, end));
    }
    Ok(query)
}

fn search(
    registry: &IndexRegistry,
    project: &Path,
    args: SearchArgs,
    out: &mut impl Write,
) -> Result<()> {
    let query = build_query(&args, registry.settings().default_limit)?;
    let hits = registry.search(project, &query).context("Search failed")?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &hits)?;
        writeln!(out)?;
    } else {
        write_hits(&hits, query.offset, out)?;
    }
    Ok(())
}

fn list_documents(
    registry: &IndexRegistry,
    project: &Path,
    doc_type: DocType,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let docs: Vec<Document> = registry.with_project(project, |index| {
        Ok(index
            .documents_by_type(doc_type)
            .into_iter()
            .cloned()
            .collect())
    })?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &docs)?;
        writeln!(out)?;
        return Ok(());
    }
    if docs.is_empty() {
        writeln!(out, "No {} documents", doc_type)?;
    }
    for doc in &docs {
        writeln!(out, "{}  {}  {}", doc.id, doc.timestamp.to_rfc3339(), summary(doc))?;
    }
    Ok(())
}

fn rebuild(registry: &IndexRegistry, project: &Path, out: &mut impl Write) -> Result<()> {
    let count = registry.rebuild(project).context("Rebuild failed")?;
    writeln!(out, "Re-indexed {} documents", count)?;
    Ok(())
}

fn show_stats(
    registry: &IndexRegistry,
    project: &Path,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let stats = registry.stats(project)?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &stats)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Documents: {}", stats.documents)?;
    writeln!(out, "Terms:     {}", stats.terms)?;
    for doc_type in DocType::ALL {
        let count = stats.by_type.get(&doc_type).copied().unwrap_or(0);
        writeln!(out, "  {:<10} {}", doc_type, count)?;
    }
    Ok(())
}

fn summary(doc: &Document) -> String {
    let text = doc.metadata.title.as_deref().unwrap_or(&doc.content);
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > 72 {
        let cut: String = line.chars().take(69).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

fn write_document(doc: &Document, out: &mut impl Write) -> Result<()> {
    writeln!(out, "id:        {}", doc.id)?;
    writeln!(out, "type:      {}", doc.doc_type)?;
    writeln!(out, "timestamp: {}", doc.timestamp.to_rfc3339())?;
    writeln!(out, "priority:  {}", doc.metadata.priority)?;
    if let Some(title) = &doc.metadata.title {
        writeln!(out, "title:     {}", title)?;
    }
    if !doc.metadata.category.is_empty() {
        writeln!(out, "category:  {}", doc.metadata.category)?;
    }
    if !doc.tags.is_empty() {
        writeln!(out, "tags:      {}", doc.tags.join(", "))?;
    }
    writeln!(out, "source:    {}", doc.metadata.source)?;
    writeln!(out)?;
    writeln!(out, "{}", doc.content)?;
    Ok(())
}

fn write_hits(hits: &SearchHits, offset: usize, out: &mut impl Write) -> Result<()> {
    if hits.is_empty() {
        writeln!(out, "No results ({} total matches)", hits.total)?;
        return Ok(());
    }
    for (i, hit) in hits.hits.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. [{:.2}] {} ({}) {}",
            offset + i + 1,
            hit.score,
            hit.document.id,
            hit.document.doc_type,
            summary(&hit.document)
        )?;
    }
    writeln!(out, "Showing {} of {} matches", hits.len(), hits.total)?;
    Ok(())
}
