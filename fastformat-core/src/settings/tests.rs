use crate::error::FormatError;
use crate::settings::config::resolve_api_key_with;
use crate::settings::manager::SettingsManager;
use crate::settings::Settings;
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_missing_file_is_created_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let settings_path = temp_dir.path().join("nested").join("settings.toml");

    let manager = SettingsManager::from_path(settings_path.clone()).unwrap();

    assert!(settings_path.exists());
    assert_eq!(manager.settings(), Settings::default());
    assert_eq!(manager.settings().voice, "Kore");
}

#[test]
fn test_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let settings_path = temp_dir.path().join("settings.toml");
    std::fs::write(&settings_path, "voice = \"Puck\"\n").unwrap();

    let manager = SettingsManager::from_path(settings_path).unwrap();
    let settings = manager.settings();

    assert_eq!(settings.voice, "Puck");
    assert_eq!(settings.text_model, "gemini-flash-lite-latest");
    assert_eq!(settings.speech_model, "gemini-2.5-flash-preview-tts");
}

#[test]
fn test_corrupt_file_is_backed_up() {
    let temp_dir = TempDir::new().unwrap();
    let settings_path = temp_dir.path().join("settings.toml");
    std::fs::write(&settings_path, "voice = [not toml").unwrap();

    let manager = SettingsManager::from_path(settings_path.clone()).unwrap();

    assert_eq!(manager.settings(), Settings::default());
    let backup = temp_dir.path().join("settings.toml.backup");
    assert_eq!(
        std::fs::read_to_string(backup).unwrap(),
        "voice = [not toml"
    );
}

#[test]
fn test_update_is_in_memory_until_saved() {
    let temp_dir = TempDir::new().unwrap();
    let settings_path = temp_dir.path().join("settings.toml");
    let manager = SettingsManager::from_path(settings_path.clone()).unwrap();

    manager.update_setting(|s| s.output_dir = Some(PathBuf::from("/tmp/audio")));
    let reloaded = SettingsManager::from_path(settings_path.clone()).unwrap();
    assert_eq!(reloaded.settings().output_dir, None);

    manager.save().unwrap();
    let reloaded = SettingsManager::from_path(settings_path).unwrap();
    assert_eq!(
        reloaded.settings().output_dir,
        Some(PathBuf::from("/tmp/audio"))
    );
}

#[test]
fn test_api_key_lookup_order() {
    let env: HashMap<&str, &str> =
        HashMap::from([("API_KEY", "primary"), ("GEMINI_API_KEY", "secondary")]);
    let key = resolve_api_key_with(|name| env.get(name).map(|v| v.to_string())).unwrap();
    assert_eq!(key, "primary");

    let env: HashMap<&str, &str> =
        HashMap::from([("API_KEY", "  "), ("GEMINI_API_KEY", "secondary")]);
    let key = resolve_api_key_with(|name| env.get(name).map(|v| v.to_string())).unwrap();
    assert_eq!(key, "secondary");
}

#[test]
fn test_missing_api_key() {
    let err = resolve_api_key_with(|_| None).unwrap_err();
    assert_eq!(err, FormatError::MissingCredential);
    assert!(err.to_string().contains("API_KEY"));
    assert!(err.remediation().is_some());
}
