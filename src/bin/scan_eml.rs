use mail_txn_import::{Extraction, ImportConfig, Message, ProviderRegistry};
use serde_json::{json, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const USAGE: &str = "usage: scan_eml <config.json> <file-or-dir> [--label LABEL] [--pretty]";

#[derive(Debug, PartialEq)]
struct ScanArgs {
    config: PathBuf,
    input: PathBuf,
    label: Option<String>,
    pretty: bool,
}

fn parse_args(args: &[String]) -> Result<ScanArgs, String> {
    let mut positional = Vec::new();
    let mut label = None;
    let mut pretty = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pretty" => pretty = true,
            "--label" => {
                let value = iter
                    .next()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| "--label needs a value".to_string())?;
                label = Some(value.to_string());
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {flag}")),
            _ => positional.push(arg.clone()),
        }
    }
    match positional.as_slice() {
        [config, input] => Ok(ScanArgs {
            config: PathBuf::from(config),
            input: PathBuf::from(input),
            label,
            pretty,
        }),
        _ => Err(USAGE.to_string()),
    }
}

fn is_scannable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("eml") || ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Files to scan under `input`, in name order. `skip` (the provider
/// configuration) is left out when it sits inside the scanned tree.
fn collect_files(input: &Path, skip: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    let skip = fs::canonicalize(skip).ok();
    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_scannable(entry.path()) => {
                if skip.is_some() && fs::canonicalize(entry.path()).ok() == skip {
                    continue;
                }
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(%err, "skipping unreadable directory entry"),
        }
    }
    files
}

fn load_message(path: &Path, label: Option<&str>) -> Result<Message, String> {
    let raw = fs::read(path).map_err(|e| format!("read failed: {e}"))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let value = serde_json::from_slice::<Value>(&raw).map_err(|e| format!("invalid message json: {e}"))?;
        let is_message = value
            .as_object()
            .is_some_and(|obj| obj.contains_key("payload") || obj.contains_key("id"));
        if !is_message {
            return Err("not a message: json has neither `payload` nor `id`".to_string());
        }
        serde_json::from_value::<Message>(value).map_err(|e| format!("invalid message json: {e}"))
    } else {
        Message::from_eml(&raw, label).map_err(|e| e.to_string())
    }
}

fn scan_file(registry: &ProviderRegistry, path: &Path, label: Option<&str>) -> Result<Extraction, String> {
    let message = load_message(path, label)?;
    registry.extract(&message).map_err(|e| e.to_string())
}

fn row(path: &Path, outcome: Result<Extraction, String>) -> Value {
    let mut value = match outcome {
        Ok(extraction) => serde_json::to_value(&extraction)
            .unwrap_or_else(|e| json!({ "status": "error", "error": format!("serialize failed: {e}") })),
        Err(error) => json!({ "status": "error", "error": error }),
    };
    if let Value::Object(map) = &mut value {
        map.insert("file".to_string(), json!(path.display().to_string()));
    }
    value
}

fn load_registry(path: &Path) -> Result<ProviderRegistry, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("read {} failed: {e}", path.display()))?;
    let config = ImportConfig::from_json_str(&raw).map_err(|e| e.to_string())?;
    ProviderRegistry::from_config(config).map_err(|e| e.to_string())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            process::exit(2);
        }
    };
    let registry = match load_registry(&args.config) {
        Ok(registry) => registry,
        Err(message) => {
            tracing::error!(config = %args.config.display(), "{message}");
            process::exit(1);
        }
    };

    let (mut matched, mut unmatched, mut failed) = (0usize, 0usize, 0usize);
    for path in collect_files(&args.input, &args.config) {
        let outcome = scan_file(&registry, &path, args.label.as_deref());
        match &outcome {
            Ok(Extraction::Matched { .. }) => matched += 1,
            Ok(Extraction::Unmatched { .. }) => unmatched += 1,
            Err(error) => {
                failed += 1;
                tracing::warn!(file = %path.display(), %error, "message failed");
            }
        }
        let value = row(&path, outcome);
        let out = if args.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        match out {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(file = %path.display(), "serialize row failed: {e}"),
        }
    }
    tracing::info!(matched, unmatched, failed, "scan finished");
}
