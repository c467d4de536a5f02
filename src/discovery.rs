//! Discovery of protected files from an ignore file
//!
//! Everything after the first line containing `# secret` (any case) is a
//! candidate path. A candidate is not guaranteed to exist; the caller
//! checks.

/// Lowercase token that opens the protected section
pub const MARKER: &str = "# secret";

/// Collects the non-empty lines that follow the marker line, in order
///
/// Lines that themselves contain the marker are never returned. Text with
/// no marker yields nothing.
pub fn discover(text: &str) -> Vec<String> {
    let mut in_section = false;
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| {
            if line.to_lowercase().contains(MARKER) {
                in_section = true;
                return false;
            }
            in_section && !line.is_empty()
        })
        .map(str::to_owned)
        .collect()
}
