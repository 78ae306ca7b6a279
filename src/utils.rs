//! Utility functions

const BYTE_UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

/// Sample storage size in binary units, e.g. `"1.5 KiB"`
pub fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        return format!("{} bytes", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = BYTE_UNITS[0];
    for next in &BYTE_UNITS[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", size, unit)
}
