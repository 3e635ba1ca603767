use std::path::{Path, PathBuf};
use std::sync::Arc;

use cascade_config::{CascadeConfig, LogFormat};
use cascade_core::{
    CancellationToken, CascadeMerger, CascadeResolver, Configuration, DeepMergeFields,
    JsonHighlighter, Layer, DEFAULT_SETTINGS,
};
use cascade_schema::{
    AuthProvider, ExtensionManifest, ExtensionPlatform, ExtensionSettings, SchemaError, Settings,
    SiteConfiguration, TaggedUnion,
};
use cascade_sdk::{Actor, CascadeError, Subject, UserId};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod fixture;

use fixture::Fixture;

#[derive(Parser)]
#[command(name = "cascade")]
#[command(about = "Merge, resolve and decode settings documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file layered above the default locations
    #[arg(short, long, global = true, env = "CASCADE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge settings files in order on top of the default document
    Merge {
        /// Settings files, lowest precedence first
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Extra field whose arrays concatenate instead of being replaced
        #[arg(short, long = "deep", value_name = "FIELD")]
        deep: Vec<String>,
        /// Indent the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Resolve the cascade for a user described by a YAML fixture
    Resolve {
        /// Fixture with `orgs` and `users` sections
        #[arg(short, long)]
        fixture: PathBuf,
        /// User id; omit to resolve for an anonymous actor
        #[arg(short, long)]
        user: Option<i32>,
        /// Also print highlighted HTML
        #[arg(long)]
        highlight: bool,
        /// Print subjects, layers and settings as one JSON object
        #[arg(long, conflicts_with = "highlight")]
        json: bool,
    },

    /// Decode a document with the typed codec and print its canonical encoding
    Decode {
        kind: DecodeKind,
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DecodeKind {
    AuthProvider,
    ExtensionPlatform,
    ExtensionSettings,
    Settings,
    Site,
    Manifest,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => cascade_config::load_from_file(path).unwrap_or_else(|e| {
            eprintln!(
                "{} Failed to load config from {}: {e}",
                "Error:".red().bold(),
                path.display()
            );
            std::process::exit(1);
        }),
        None => cascade_config::load().unwrap_or_else(|e| {
            eprintln!("{} Failed to load config: {e}, using defaults", "Warning:".yellow().bold());
            CascadeConfig::default()
        }),
    };

    init_logging(&config);

    let result = match cli.command {
        Commands::Merge {
            files,
            deep,
            pretty,
        } => cmd_merge(&config, &files, deep, pretty),
        Commands::Resolve {
            fixture,
            user,
            highlight,
            json,
        } => cmd_resolve(&config, &fixture, user, highlight, json).await,
        Commands::Decode { kind, file } => cmd_decode(kind, &file),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(config: &CascadeConfig) {
    let filter = if config.logging.filter.is_empty() {
        config.logging.level.as_str().to_string()
    } else {
        config.logging.filter.clone()
    };

    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(filter));
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Pretty => registry.with(layer.pretty()).init(),
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}

fn cmd_merge(
    config: &CascadeConfig,
    files: &[PathBuf],
    deep: Vec<String>,
    pretty: bool,
) -> Result<(), String> {
    let mut documents = vec![default_document(config)?];
    for file in files {
        documents.push(read_file(file)?);
    }

    let deep_fields: DeepMergeFields = config
        .cascade
        .deep_merge_fields
        .iter()
        .cloned()
        .chain(deep)
        .collect();
    let merged = CascadeMerger::new(deep_fields)
        .merge(&documents)
        .map_err(|e| describe_merge_error(&e, files))?;

    if !merged.deep_merged().is_empty() {
        tracing::info!(fields = ?merged.deep_merged(), "deep-merged fields");
    }

    let configuration = Configuration::from_merged(&merged);
    if pretty {
        println!("{}", configuration.pretty().map_err(|e| e.to_string())?);
    } else {
        println!("{}", configuration.contents());
    }
    Ok(())
}

/// Machine-readable output of `cascade resolve --json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Resolution<'a> {
    subjects: &'a [Subject],
    layers: Vec<Subject>,
    deep_merged: &'a [String],
    settings: Value,
}

async fn cmd_resolve(
    config: &CascadeConfig,
    fixture: &Path,
    user: Option<i32>,
    highlight: bool,
    json: bool,
) -> Result<(), String> {
    let (directory, store) = Fixture::load(fixture)?.into_providers().await;
    let resolver = CascadeResolver::new(Arc::new(directory), Arc::new(store))
        .with_deep_merge_fields(config.cascade.deep_merge_fields.iter().cloned().collect())
        .with_default_document(default_document(config)?)
        .with_fetch_concurrency(config.cascade.effective_fetch_concurrency());

    let actor = user.map_or_else(Actor::anonymous, |id| Actor::user(UserId(id)));
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let subjects = resolver
        .subjects(&actor, &cancel)
        .await
        .map_err(|e| e.to_string())?;
    let layers = resolver
        .fetch_layers(&subjects, &cancel)
        .await
        .map_err(|e| e.to_string())?;
    let configuration = resolver
        .fold(&actor, &layers)
        .map_err(|e| attribute_error(&layers, &e))?;

    if json {
        let resolution = Resolution {
            subjects: &subjects,
            layers: layers.iter().map(|layer| layer.subject).collect(),
            deep_merged: configuration.deep_merged(),
            settings: Value::Object(configuration.fields().map_err(|e| e.to_string())?),
        };
        let text = serde_json::to_string_pretty(&resolution).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    println!("{} {}", "Subjects:".bold(), format_subjects(&subjects));
    if !configuration.deep_merged().is_empty() {
        println!(
            "{} {}",
            "Deep-merged:".bold(),
            configuration.deep_merged().join(", ")
        );
    }
    println!("{}", configuration.pretty().map_err(|e| e.to_string())?);

    if highlight {
        let budget = config.highlight.timeout();
        let highlighter = JsonHighlighter::new()
            .with_max_bytes(config.highlight.max_bytes)
            .with_time_limit(budget);
        let html = configuration
            .highlighted(&highlighter, budget, &cancel)
            .await
            .map_err(|e| e.to_string())?;
        println!("{html}");
    }
    Ok(())
}

fn cmd_decode(kind: DecodeKind, file: &Path) -> Result<(), String> {
    let text = read_file(file)?;
    let document: Value = cascade_core::from_str_with_comments(&text)
        .map_err(|e| format!("{}: {e}", file.display()))?;

    let value = match kind {
        DecodeKind::AuthProvider => reencode_union::<AuthProvider>(document),
        DecodeKind::ExtensionPlatform => reencode_union::<ExtensionPlatform>(document),
        DecodeKind::ExtensionSettings => reencode::<ExtensionSettings>(document),
        DecodeKind::Settings => reencode::<Settings>(document),
        DecodeKind::Site => reencode::<SiteConfiguration>(document),
        DecodeKind::Manifest => reencode::<ExtensionManifest>(document),
    }
    .map_err(|e| format!("{}: {e}", file.display()))?;

    println!("{value}");
    Ok(())
}

fn reencode_union<U: TaggedUnion>(document: Value) -> Result<Value, SchemaError> {
    let union: U = cascade_schema::decode_value(document)?;
    cascade_schema::encode_value(&union)
}

fn reencode<T: Serialize + DeserializeOwned>(document: Value) -> Result<Value, SchemaError> {
    let record: T = serde_json::from_value(document)?;
    Ok(serde_json::to_value(&record)?)
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))
}

fn default_document(config: &CascadeConfig) -> Result<String, String> {
    match config.cascade.default_document_path().map_err(|e| e.to_string())? {
        Some(path) => read_file(&path),
        None => Ok(DEFAULT_SETTINGS.to_string()),
    }
}

/// Names the file behind a parse error; index 0 is the default document.
fn describe_merge_error(err: &CascadeError, files: &[PathBuf]) -> String {
    match err.document_index() {
        Some(0) => format!("default document: {err}"),
        Some(index) => files
            .get(index - 1)
            .map_or_else(|| err.to_string(), |file| format!("{}: {err}", file.display())),
        None => err.to_string(),
    }
}

/// Names the subject whose document failed to parse.
fn attribute_error(layers: &[Layer], err: &CascadeError) -> String {
    err.document_index()
        .and_then(|index| layers.get(index))
        .map_or_else(
            || err.to_string(),
            |layer| format!("settings of {}: {err}", layer.subject),
        )
}

fn format_subjects(subjects: &[Subject]) -> String {
    if subjects.is_empty() {
        return "(none)".to_string();
    }
    subjects
        .iter()
        .map(|subject| subject.to_string().cyan().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling resolution");
            cancel.cancel();
        }
    });
}
