//! Small shared helpers.

use std::path::Path;

/// Render a path for logs with the home directory replaced by `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Format a coordinate pair as `40.713°N, 74.006°W`.
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    let lat_dir = if latitude >= 0.0 { "N" } else { "S" };
    let lon_dir = if longitude >= 0.0 { "E" } else { "W" };
    format!(
        "{:.3}°{}, {:.3}°{}",
        latitude.abs(),
        lat_dir,
        longitude.abs(),
        lon_dir
    )
}

/// Pluralize a duration in whole units, e.g. "1 minute" / "10 minutes".
pub fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
