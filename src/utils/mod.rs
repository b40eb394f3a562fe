/// Normalizes a string into a lowercase, hyphen-joined token usable in file
/// names: runs of non-alphanumeric characters collapse into a single `-`,
/// leading and trailing separators are dropped.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;

    for ch in value.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

const SIZE_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Formats a byte count for console output, e.g. `3.4 KiB`.
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} {}", SIZE_UNITS[0])
    } else {
        format!("{size:.1} {}", SIZE_UNITS[unit])
    }
}

/// Hex-encoded MD5 checksum of a byte buffer.
pub fn md5_hex(content: &[u8]) -> String {
    format!("{:x}", md5::compute(content))
}
