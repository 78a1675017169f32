/*!
CVKit CLI - Command-line interface for the CVKit résumé builder.

This CLI manages the named versions kept in a CVKit store, validates and
exports résumé documents, and seeds documents from the starter templates.
Documents are exchanged as the same JSON files the JSON export produces.
*/

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use cvkit_core::{
    apply_template, export::format_date_fr, open_version_store, templates, validate_document,
    Document, DynKeyValueStore, ExportFormat, Exporter, LogFormat, StoreConfig, Version,
    VersionStore,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use tracing::{debug, info};

type Store = VersionStore<DynKeyValueStore>;

#[derive(Parser, Debug)]
#[command(name = "cvkit")]
#[command(about = "CLI for the CVKit résumé builder")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log record format
    #[arg(long, global = true, value_enum, default_value = "compact")]
    log_format: LogFormatArg,

    /// Store location: a directory, or memory:// for a throwaway store
    #[arg(
        short,
        long,
        global = true,
        env = "CVKIT_STORE",
        default_value = ".cvkit"
    )]
    store: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormatArg {
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Json,
    Html,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Html => ExportFormat::Html,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage saved versions
    #[command(subcommand)]
    Versions(VersionCommands),
    /// Export a saved version or a document file
    Export {
        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatArg,
        /// Id of the version to export (defaults to the current version)
        #[arg(long, conflicts_with = "input")]
        id: Option<String>,
        /// Document file to export instead of a stored version
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Browse and apply starter templates
    #[command(subcommand)]
    Templates(TemplateCommands),
    /// Check every section of a document file against the form rules
    Validate {
        /// Document file
        file: PathBuf,
    },
    /// Report whether this store is used for the first time
    FirstVisit,
}

#[derive(Subcommand, Debug)]
enum VersionCommands {
    /// List all saved versions
    List,
    /// Show details of a specific version
    Show {
        id: String,
        /// Print the stored document as well
        #[arg(short, long)]
        data: bool,
    },
    /// Save a document file as a new version and make it current
    Save {
        /// Document file
        file: PathBuf,
        /// Version name, numbered automatically
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Delete a version
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Write a version's document to a file and make it current
    Load {
        id: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Delete every version
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show the current version, or point it elsewhere with --set
    Current {
        #[arg(long)]
        set: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// List the available templates
    List,
    /// Write a document pre-filled from a template
    Apply {
        id: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Tabled)]
struct VersionInfo {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Saved")]
    saved: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Current")]
    current: String,
}

#[derive(Tabled)]
struct TemplateInfo {
    #[tabled(rename = "ID")]
    id: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Theme")]
    theme: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
}

#[derive(Tabled)]
struct IssueInfo {
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Message")]
    message: String,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Initialize logging
    let directive = if cli.verbose { "debug" } else { "info" };
    cvkit_core::init_tracing(cli.log_format.into(), directive)?;

    let config = StoreConfig::from_uri(&cli.store)?;

    // Execute command
    match cli.command {
        Commands::Versions(command) => run_versions(&config, command),
        Commands::Export {
            format,
            id,
            input,
            out,
        } => export_document(&config, format.into(), id, input, out.as_deref()),
        Commands::Templates(command) => run_templates(command),
        Commands::Validate { file } => validate_file(&file),
        Commands::FirstVisit => {
            let store = open_version_store(&config)?;
            println!("{}", store.is_first_visit());
            Ok(())
        }
    }
}

fn run_versions(config: &StoreConfig, command: VersionCommands) -> Result<(), anyhow::Error> {
    let store = open_version_store(config)?;

    match command {
        VersionCommands::List => list_versions(&store),
        VersionCommands::Show { id, data } => show_version(&store, &id, data),
        VersionCommands::Save { file, name } => {
            let document = read_document(&file)?;
            let version = store.save_version(&document, name.as_deref());
            println!("✓ Saved '{}' ({})", version.name(), version.id());
            Ok(())
        }
        VersionCommands::Delete { id, force } => delete_version(&store, &id, force),
        VersionCommands::Load { id, out } => {
            let mut document = Document::new();
            let version = store
                .load_version(&id, &mut document)
                .with_context(|| format!("No version with id '{id}'"))?;
            write_output(out.as_deref(), serde_json::to_string_pretty(&document)?.as_bytes())?;
            info!(id = version.id(), name = version.name(), "Loaded version");
            Ok(())
        }
        VersionCommands::Clear { force } => {
            if !force && !confirm("Delete every saved version?")? {
                println!("Clear cancelled");
                return Ok(());
            }
            store.clear_all();
            println!("✓ All versions deleted");
            Ok(())
        }
        VersionCommands::Current { set: Some(id) } => {
            if store.version(&id).is_none() {
                bail!("No version with id '{id}'");
            }
            store.set_current_version(&id);
            println!("✓ Current version is now {id}");
            Ok(())
        }
        VersionCommands::Current { set: None } => {
            match (store.current_version(), store.current_version_id()) {
                (Some(version), _) => print_version(&version, true),
                (None, Some(dangling)) => println!("Current version {dangling} no longer exists"),
                (None, None) => println!("No current version"),
            }
            Ok(())
        }
    }
}

fn list_versions(store: &Store) -> Result<(), anyhow::Error> {
    let versions = store.versions();
    if versions.is_empty() {
        println!("No versions found");
        return Ok(());
    }

    let current = store.current_version_id();
    let rows = versions
        .iter()
        .map(|version| {
            Ok(VersionInfo {
                id: version.id().to_string(),
                name: version.name().to_string(),
                saved: format_timestamp(version),
                size: format_size(serde_json::to_vec(version.data())?.len() as u64),
                current: if current.as_deref() == Some(version.id()) {
                    "*".to_string()
                } else {
                    String::new()
                },
            })
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;

    println!("{}", Table::new(rows));
    Ok(())
}

fn show_version(store: &Store, id: &str, with_data: bool) -> Result<(), anyhow::Error> {
    let version = store
        .version(id)
        .with_context(|| format!("No version with id '{id}'"))?;
    let is_current = store.current_version_id().as_deref() == Some(version.id());
    print_version(&version, is_current);

    if with_data {
        println!("{}", serde_json::to_string_pretty(version.data())?);
    }
    Ok(())
}

fn print_version(version: &Version, is_current: bool) {
    let data = version.data();
    println!("Version Details:");
    println!("  ID: {}", version.id());
    println!("  Name: {}", version.name());
    println!("  Saved: {}", format_timestamp(version));
    println!("  Current: {}", if is_current { "yes" } else { "no" });
    println!("  Full name: {}", data.personal_details.full_name);
    println!("  Theme: {}", data.theme);
    println!(
        "  Sections: {} experiences, {} educations, {} languages, {} skills, {} hobbies",
        data.experiences.len(),
        data.educations.len(),
        data.languages.len(),
        data.skills.len(),
        data.hobbies.len()
    );
}

fn delete_version(store: &Store, id: &str, force: bool) -> Result<(), anyhow::Error> {
    if !force && !confirm(&format!("Are you sure you want to delete version '{id}'?"))? {
        println!("Deletion cancelled");
        return Ok(());
    }

    if !store.delete_version(id) {
        bail!("No version with id '{id}'");
    }
    println!("✓ Version deleted successfully");
    if let Some(current) = store.current_version() {
        println!("  Current version: {} ({})", current.name(), current.id());
    }
    Ok(())
}

fn export_document(
    config: &StoreConfig,
    format: ExportFormat,
    id: Option<String>,
    input: Option<PathBuf>,
    out: Option<&Path>,
) -> Result<(), anyhow::Error> {
    let document = match (input, id) {
        (Some(path), _) => read_document(&path)?,
        (None, Some(id)) => open_version_store(config)?
            .version(&id)
            .with_context(|| format!("No version with id '{id}'"))?
            .into_data(),
        (None, None) => open_version_store(config)?
            .current_version()
            .context("No current version to export; pass --id or --input")?
            .into_data(),
    };

    let artifact = Exporter::new().export(format, &document)?;
    write_output(out, &artifact.bytes)?;
    debug!(file = artifact.file_name, bytes = artifact.bytes.len(), "Export written");
    Ok(())
}

fn run_templates(command: TemplateCommands) -> Result<(), anyhow::Error> {
    match command {
        TemplateCommands::List => {
            let rows: Vec<_> = templates()
                .iter()
                .map(|t| TemplateInfo {
                    id: t.id,
                    name: t.name,
                    theme: t.theme,
                    description: t.description,
                })
                .collect();
            println!("{}", Table::new(rows));
            Ok(())
        }
        TemplateCommands::Apply { id, out } => {
            let mut document = Document::new();
            if !apply_template(&id, &mut document) {
                bail!("Unknown template '{id}'");
            }
            write_output(out.as_deref(), serde_json::to_string_pretty(&document)?.as_bytes())
        }
    }
}

fn validate_file(path: &Path) -> Result<(), anyhow::Error> {
    let document = read_document(path)?;
    let issues = validate_document(&document);
    if issues.is_empty() {
        println!("✓ {} is valid", path.display());
        return Ok(());
    }

    let count = issues.len();
    let rows: Vec<_> = issues
        .into_iter()
        .map(|issue| IssueInfo {
            section: issue.section.to_string(),
            entry: issue.index.map(|i| (i + 1).to_string()).unwrap_or_default(),
            field: issue.field.to_string(),
            message: issue.message,
        })
        .collect();
    println!("{}", Table::new(rows));
    bail!("{count} validation issue(s) in {}", path.display())
}

fn read_document(path: &Path) -> Result<Document, anyhow::Error> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a CV document", path.display()))
}

fn write_output(out: Option<&Path>, bytes: &[u8]) -> Result<(), anyhow::Error> {
    match out {
        Some(path) => {
            std::fs::write(path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool, anyhow::Error> {
    print!("{question} (y/N): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_lowercase().starts_with('y'))
}

fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Local time of the save, followed by the French date used in exports
fn format_timestamp(version: &Version) -> String {
    let local = version.date().with_timezone(&chrono::Local);
    format!(
        "{} ({})",
        local.format("%Y-%m-%d %H:%M:%S"),
        format_date_fr(&local.format("%Y-%m-%d").to_string())
    )
}
