// Human-readable byte sizes

const FACTOR: f64 = 1024.0;
const UNITS: [&str; 6] = ["", "K", "M", "G", "T", "P"];

/// Scale a byte count to the largest unit that keeps it below 1024,
/// e.g. `1253656` to `"1.20MB"`. Values beyond the petabyte range stay in `P`.
///
/// The unit is chosen on the rounded rendering, so `1048575` is `"1.00MB"`
/// rather than `"1024.00KB"`.
pub fn format_size(bytes: u64, suffix: &str) -> String {
    let mut value = bytes as f64;
    let mut idx = 0;
    loop {
        let rendered = format!("{value:.2}");
        let fits = rendered.parse::<f64>().is_ok_and(|v| v < FACTOR);
        if fits || idx + 1 == UNITS.len() {
            return format!("{rendered}{}{suffix}", UNITS[idx]);
        }
        value /= FACTOR;
        idx += 1;
    }
}

/// `format_size` with the `B` suffix.
pub fn human_bytes(bytes: u64) -> String {
    format_size(bytes, "B")
}
