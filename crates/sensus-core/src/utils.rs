//! Utility functions for the census dashboard

/// Sanitize filename for safe storage
///
/// Path separators and other unsafe characters become underscores; leading
/// and trailing dots and underscores are dropped.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '.' || c == '_' || c == '-' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim_matches(|c| c == '_' || c == '.')
        .to_string()
}

/// File name announced by a `Content-Disposition` header, sanitized
///
/// Returns `None` when the header carries no usable `filename=` parameter.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let start = header.find("filename=")? + "filename=".len();
    let raw = header[start..].split(';').next().unwrap_or_default().trim();
    let unquoted = raw.trim_matches(|c| c == '"' || c == '\'');
    let name = sanitize_filename(unquoted);
    (!name.is_empty()).then_some(name)
}

/// Group thousands with dots, the Indonesian convention
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
