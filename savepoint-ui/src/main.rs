mod offline;
mod runtime;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use savepoint_core::config::{self, Config};
use savepoint_core::controller::AutoSaveHandle;
use savepoint_core::store::{LocalStore, MemoryStore, SqliteStore};
use savepoint_core::target::FileTarget;

use offline::SwitchableTarget;
use runtime::AppRuntime;
use ui::RatatuiBackend;

const USAGE: &str = "usage: savepoint [--verbose|-v] [--remote PATH] [--offline]

  --remote PATH   file the document is saved to (overrides [remote] path)
  --offline       start with the remote unreachable (toggle with Ctrl-O)
  -v, --verbose   debug logging";

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = config::data_dir().join("savepoint.log");
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("savepoint: cannot create {}: {}", log_path.display(), e);
            return;
        }
    };

    if WriteLogger::init(log_level, Config::default(), log_file).is_err() {
        eprintln!("savepoint: logger already initialized");
        return;
    }

    log::info!("savepoint starting (log level: {:?})", log_level);
}

fn open_local_store(config: &Config) -> Option<Box<dyn LocalStore>> {
    if !config.local_enabled() {
        return None;
    }
    let quota = config.local_quota_bytes();
    let path = config::data_dir().join("local.sqlite");
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match SqliteStore::open(&path, quota) {
        Ok(store) => Some(Box::new(store)),
        Err(e) => {
            log::warn!(target: "store", "cannot open {}: {}; using in-memory fallback", path.display(), e);
            Some(Box::new(MemoryStore::new(quota)))
        }
    }
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let start_offline = args.iter().any(|a| a == "--offline");
    let remote_arg = args
        .iter()
        .position(|a| a == "--remote")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);

    init_logging(verbose);

    let config = Config::load();
    let remote_path = remote_arg.unwrap_or_else(|| config.remote_path());
    if let Some(parent) = remote_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let remote_label = remote_path.display().to_string();

    let offline = Arc::new(AtomicBool::new(start_offline));
    let remote = SwitchableTarget::new(FileTarget::new(remote_path), offline.clone());

    let document = Arc::new(Mutex::new(String::new()));
    let source = {
        let document = document.clone();
        move || document.lock().map(|d| d.clone()).unwrap_or_default()
    };

    let autosave = AutoSaveHandle::spawn(config.autosave(), source, remote, open_local_store(&config))?;
    let mut app = AppRuntime::new(autosave, document, offline, remote_label);

    let mut backend = RatatuiBackend::new()?;
    backend.start()?;
    let result = app.run(&mut backend);
    backend.stop()?;

    log::info!("savepoint exiting");
    result
}
