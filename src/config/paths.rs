use std::path::PathBuf;

const APP_ID: &str = "com.gaia.app";

/// Platform-specific app data directory.
pub fn app_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support");
            dir.push(APP_ID);
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push(APP_ID);
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share");
            dir.push(APP_ID);
            return dir;
        }
    }

    // Fallback
    PathBuf::from("data")
}

pub fn schedule_config_path() -> PathBuf {
    app_data_dir().join("schedule.toml")
}

pub fn lesson_catalog_path() -> PathBuf {
    app_data_dir().join("lessons.json")
}

/// Directory backing the file-based user storage (one JSON file per key).
pub fn storage_dir() -> PathBuf {
    app_data_dir().join("storage")
}
