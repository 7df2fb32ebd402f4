const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size, e.g. `1536.0` -> `"1.5 KB"`.
///
/// Uses 1024-based units with at most two decimals; trailing zeros are dropped.
pub fn format_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 Bytes".to_string();
    }

    let exponent = (bytes.ln() / 1024f64.ln()).floor().max(0.0) as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes / 1024f64.powi(exponent as i32);

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent])
}
