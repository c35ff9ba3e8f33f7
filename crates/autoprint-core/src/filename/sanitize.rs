//! Turn a server-suggested filename into one safe path component.

const NAME_MAX: usize = 255;

/// Sanitizes a suggested filename so it cannot escape the output directory.
///
/// - Replaces `/`, `\`, NUL, and other control characters with `_`
/// - Trims leading/trailing dots and whitespace (so `.` and `..` become empty)
/// - Limits length to 255 bytes (Linux NAME_MAX)
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
