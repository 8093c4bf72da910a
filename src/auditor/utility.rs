//! General utility functions.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Name of the per-user working folder.
pub const AUDIT_FOLDER_NAME: &str = ".compas_audit";

/// Resolve the audit working folder.
///
/// A `.compas_audit` folder in the current directory wins; otherwise the
/// folder is created under the home directory.
fn get_audit_dir(temp_name: &str) -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let temp_path = cwd.join(temp_name);

    if temp_path.exists() {
        return temp_path;
    }

    let home_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let temp_path = home_path.join(temp_name);

    if !temp_path.exists() {
        let _ = fs::create_dir_all(&temp_path);
    }

    temp_path
}

/// Temp directory holding settings and logs
pub static TEMP_DIR: LazyLock<PathBuf> = LazyLock::new(|| get_audit_dir(AUDIT_FOLDER_NAME));

/// Get path for temp file with filename
pub fn get_file_path(filename: &str) -> PathBuf {
    TEMP_DIR.join(filename)
}

/// Get path for temp folder with folder name, creating it when missing
pub fn get_folder_path(folder_name: &str) -> PathBuf {
    let folder_path = TEMP_DIR.join(folder_name);
    if !folder_path.exists() {
        let _ = fs::create_dir_all(&folder_path);
    }
    folder_path
}

/// Format a metric the way the console report does: three decimals, `NaN` verbatim.
pub fn format_metric(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.3}", value)
    }
}

/// Divide, yielding NaN when the denominator is zero.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}
