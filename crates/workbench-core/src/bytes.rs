//! Human-readable byte counts.

const UNITS: &[&str] = &["KB", "MB", "GB", "TB", "PB"];

/// Format a byte count for display: `"0 bytes"`, `"512 bytes"`, `"10.0 KB"`.
///
/// 1024-based units, one decimal above the byte range.
pub fn nice_size(bytes: u64) -> String {
    if bytes == 1 {
        return "1 byte".to_owned();
    }
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    let mut value = bytes as f64;
    let mut unit = "";
    for u in UNITS {
        value /= 1024.0;
        unit = u;
        if value < 1024.0 {
            break;
        }
    }
    format!("{value:.1} {unit}")
}
