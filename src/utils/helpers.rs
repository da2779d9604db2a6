/// Formatting helpers shared by the dashboard and the status command

const MIB: f64 = 1024.0 * 1024.0;

/// Bytes to mebibytes
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

/// First 12 characters of a container ID, as `docker ps` shows it
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Truncate string with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
