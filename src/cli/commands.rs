//! CLI command implementations
//!
//! Every command loads and validates the configuration first. Commands that
//! need the store open it through [`boot_store`], which replays the record
//! file in full: a store that cannot be read completely is never served.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info};

use crate::http_server::HttpServer;
use crate::item::{Document, ID_FIELD};
use crate::observability::{self, Event, ObservationScope};
use crate::storage::{FileStore, ItemStore, MemoryStore, DATA_SUBDIR};

use super::args::Command;
use super::config::{Config, StorageBackend};
use super::errors::{CliError, CliResult};
use super::io::{write_response, write_response_to};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let config = Config::load(cmd.config_path())?;
    observability::init(&config.log_level, config.log_format)?;
    info!(
        event = Event::ConfigLoaded.as_str(),
        path = %cmd.config_path().display(),
        data_dir = %config.data_dir,
        storage_backend = config.storage_backend.as_str()
    );

    match cmd {
        Command::Init { .. } => init(&config),
        Command::Serve { port, .. } => serve(&config, port),
        Command::Dump { .. } => dump(&config),
        Command::Compact { .. } => compact(&config),
    }
}

/// Initialize a new itemstore data directory
///
/// - Creates the directory layout
/// - Does NOT start the server
/// - Writes no records
pub fn init(config: &Config) -> CliResult<()> {
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::already_initialized());
    }

    let dir = data_dir.join(DATA_SUBDIR);
    fs::create_dir_all(&dir).map_err(|e| {
        CliError::config_error(format!("Failed to create directory {:?}: {}", dir, e))
    })?;

    info!(event = Event::InitComplete.as_str(), data_dir = %data_dir.display());
    write_response(json!({"initialized": true}))?;

    Ok(())
}

/// Boot the store and serve the HTTP API until Ctrl-C
///
/// Startup sequence:
/// 1. Open the store (replay and index rebuild for the file backend)
/// 2. Build the router around the injected store
/// 3. Bind and serve, shutting down gracefully on Ctrl-C
pub fn serve(config: &Config, port: Option<u16>) -> CliResult<()> {
    observability::log_event(Event::BootStart);
    let store = boot_store(config)?;
    let server = HttpServer::with_config(store, config.http_config(port));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Print every stored item to stdout as `{"status":"ok","data":[...]}`
pub fn dump(config: &Config) -> CliResult<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    dump_to(config, &mut handle)
}

/// Write every stored item to `writer`, sorted by id
pub fn dump_to<W: Write>(config: &Config, writer: &mut W) -> CliResult<()> {
    let store = boot_store(config)?;
    let mut documents = store
        .list()
        .map_err(|e| CliError::command_failed(format!("Failed to list items: {}", e)))?;
    documents.sort_by(|a, b| document_id(a).cmp(document_id(b)));

    info!(event = Event::DumpComplete.as_str(), items = documents.len());
    write_response_to(
        writer,
        Value::Array(documents.into_iter().map(Value::Object).collect()),
    )
}

/// Rewrite the record file keeping only live items
///
/// Only meaningful for the file backend.
pub fn compact(config: &Config) -> CliResult<()> {
    let data = compact_store(config)?;
    write_response(data)
}

fn compact_store(config: &Config) -> CliResult<Value> {
    if config.storage_backend != StorageBackend::File {
        return Err(CliError::config_error(
            "compact requires storage_backend 'file'",
        ));
    }

    let store = open_file_store(config.data_path())?;
    let scope = ObservationScope::new(Event::CompactionStart);
    match store.compact() {
        Ok(report) => {
            scope.complete(Event::CompactionComplete);
            Ok(json!({
                "items": report.items,
                "bytes_before": report.bytes_before,
                "bytes_after": report.bytes_after,
            }))
        }
        Err(e) => {
            scope.fail(Event::CompactionFailed, &e.to_string());
            Err(CliError::command_failed(format!("Compaction failed: {}", e)))
        }
    }
}

/// Check if a data directory is initialized
fn is_initialized(data_dir: &Path) -> bool {
    data_dir.join(DATA_SUBDIR).is_dir()
}

/// Open the configured store
///
/// FATAL: a file store that fails to open (corruption, I/O) halts startup.
/// No partial startup. No serving from a partially read file.
fn boot_store(config: &Config) -> CliResult<Arc<dyn ItemStore>> {
    let store: Arc<dyn ItemStore> = match config.storage_backend {
        StorageBackend::File => Arc::new(open_file_store(config.data_path())?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };

    let items = store
        .len()
        .map_err(|e| CliError::boot_failed(format!("Store unreadable: {}", e)))?;
    info!(
        event = Event::StoreOpened.as_str(),
        storage_backend = config.storage_backend.as_str(),
        items
    );

    Ok(store)
}

fn open_file_store(data_dir: &Path) -> CliResult<FileStore> {
    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }

    FileStore::open(data_dir).map_err(|e| {
        error!(
            event = Event::StoreOpenFailed.as_str(),
            code = e.code(),
            error = %e
        );
        CliError::boot_failed(format!("Store open failed (FATAL): {}", e))
    })
}

fn document_id(document: &Document) -> &str {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use crate::item::ItemId;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir, extra: Value) -> Config {
        let mut config = json!({
            "data_dir": temp_dir.path().join("store").to_string_lossy()
        });
        if let (Some(base), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }

        let config_path = temp_dir.path().join("itemstore.json");
        fs::write(&config_path, config.to_string()).unwrap();
        Config::load(&config_path).unwrap()
    }

    fn seed(config: &Config, items: &[(&str, &str)]) {
        let store = FileStore::open(config.data_path()).unwrap();
        for (id, price) in items {
            let document: Document = serde_json::from_str(&format!(
                r#"{{"id": "{}", "name": "n", "price": {}}}"#,
                id, price
            ))
            .unwrap();
            store.put(&ItemId::parse(*id).unwrap(), document).unwrap();
        }
    }

    #[test]
    fn test_init_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir, json!({}));

        init(&config).unwrap();

        assert!(config.data_path().join("data").is_dir());
    }

    #[test]
    fn test_init_refuses_reinit() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir, json!({}));

        init(&config).unwrap();

        let result = init(&config);
        assert_eq!(
            result.unwrap_err().code(),
            &CliErrorCode::AlreadyInitialized
        );
    }

    #[test]
    fn test_dump_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir, json!({}));

        let result = dump_to(&config, &mut Vec::new());
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::NotInitialized);
    }

    #[test]
    fn test_dump_writes_sorted_items() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir, json!({}));
        init(&config).unwrap();
        seed(&config, &[("b", "100"), ("a", "19.99")]);

        let mut out = Vec::new();
        dump_to(&config, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#""price":19.99"#));
        assert!(text.contains(r#""price":100"#));
        let value: Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["status"], json!("ok"));
        let ids: Vec<&str> = value["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_memory_backend_needs_no_init() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir, json!({"storage_backend": "memory"}));

        let mut out = Vec::new();
        dump_to(&config, &mut out).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["data"], json!([]));
    }

    #[test]
    fn test_compact_reports_sizes() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir, json!({}));
        init(&config).unwrap();
        seed(&config, &[("a", "1"), ("a", "2"), ("a", "3")]);

        let report = compact_store(&config).unwrap();
        assert_eq!(report["items"], json!(1));
        assert!(report["bytes_after"].as_u64().unwrap() < report["bytes_before"].as_u64().unwrap());
    }

    #[test]
    fn test_compact_rejects_memory_backend() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir, json!({"storage_backend": "memory"}));

        let result = compact_store(&config);
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_corrupted_store_fails_boot() {
        let temp_dir = TempDir::new().unwrap();
        let config = create_config(&temp_dir, json!({}));
        init(&config).unwrap();
        seed(&config, &[("a", "1")]);

        let path = FileStore::record_path(config.data_path());
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        let result = dump_to(&config, &mut Vec::new());
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::BootFailed);
    }
}
