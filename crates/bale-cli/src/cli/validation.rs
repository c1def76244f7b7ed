use bale_bundler::CommentPolicy;

/// Parse a UMD standalone name.
///
/// The name is one or more JavaScript identifiers joined by dots, such as
/// `MyLib` or `Acme.widgets`.
///
/// # Errors
///
/// Returns an error message if any segment is not a valid identifier.
pub fn parse_standalone(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Standalone name cannot be empty".to_string());
    }
    if !is_identifier_path(s) {
        return Err(format!(
            "Standalone name must be a JavaScript identifier or dotted path of identifiers: '{}'",
            s
        ));
    }
    Ok(s.to_string())
}

/// Returns true if `s` is a dot-separated path of JavaScript identifiers.
pub fn is_identifier_path(s: &str) -> bool {
    s.split('.').all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

pub fn parse_comments(s: &str) -> Result<CommentPolicy, String> {
    CommentPolicy::parse(s)
}
