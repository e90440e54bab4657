//! Formatted output helpers for CLI commands.

/// Formats a byte count into a human-readable string (e.g., "3.2 KiB").
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;

    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Joins component names for a summary line, or `(none)` when empty.
#[must_use]
pub fn join_names(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_owned()
    } else {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_displays_bytes() {
        assert_eq!(format_bytes(512), "512 B");
    }

    #[test]
    fn format_bytes_displays_kib() {
        assert_eq!(format_bytes(3277), "3.2 KiB");
    }

    #[test]
    fn format_bytes_displays_mib() {
        assert_eq!(format_bytes(2_097_152), "2.0 MiB");
    }

    #[test]
    fn join_names_lists_in_order() {
        assert_eq!(join_names(&["web".into(), "api".into()]), "web, api");
    }

    #[test]
    fn join_names_marks_empty() {
        assert_eq!(join_names(&[]), "(none)");
    }
}
