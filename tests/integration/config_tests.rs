use apodcache::cli::Cli;
use apodcache::config::Config;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;

// Environment variables are process-wide; serialize tests that touch them.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ENV_VARS: &[&str] = &[
    "APODCACHE_API_KEY",
    "APODCACHE_API_URL",
    "APODCACHE_CACHE_DIR",
    "APODCACHE_TIMEOUT_SECS",
    "APODCACHE_BACKGROUND_COMMAND",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_missing_file_yields_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();

    let config = Config::try_load_from_path(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_from_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
api_key = "my-key"
cache_dir = "/srv/apod"
timeout_secs = 5
background_command = "feh --bg-scale {path}"
"#,
    )
    .unwrap();

    let config = Config::try_load_from_path(&path).unwrap();
    assert_eq!(config.api_key, "my-key");
    assert_eq!(config.api_url, "https://api.nasa.gov/planetary/apod");
    assert_eq!(config.cache_dir, Some(PathBuf::from("/srv/apod")));
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(
        config.background_command.as_deref(),
        Some("feh --bg-scale {path}")
    );
}

#[test]
fn test_env_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "api_key = \"from-file\"\ntimeout_secs = 5\n").unwrap();

    std::env::set_var("APODCACHE_API_KEY", "from-env");
    let config = Config::try_load_from_path(&path);
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.api_key, "from-env");
    assert_eq!(config.timeout_secs, 5);
}

#[test]
fn test_invalid_toml_is_an_error_but_load_falls_back() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "timeout_secs = \"soon\"\n").unwrap();

    assert!(Config::try_load_from_path(&path).is_err());
    assert_eq!(Config::load_from_path(&path), Config::default());
}

#[test]
fn test_cli_cache_dir_wins() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "cache_dir = \"/from/file\"\n").unwrap();

    let mut config = Config::try_load_from_path(&path).unwrap();
    let cli = Cli::parse_from(["apodcache", "--cache-dir", "/from/cli"]);
    config.merge_cli(&cli);

    assert_eq!(config.cache_parent().unwrap(), PathBuf::from("/from/cli"));
}
