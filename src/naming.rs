use uuid::Uuid;

/// Returns a random identifier that is unique with overwhelming probability.
///
/// No lookup against existing storage is performed.
pub fn unique_name() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Returns the extension of the final path component, including the dot.
///
/// Returns an empty string when there is no dot, and drops extensions that
/// contain anything other than ASCII alphanumerics, `_` or `-`.
pub fn extension(file_name: &str) -> &str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let Some(dot) = base.rfind('.') else {
        return "";
    };

    let ext = &base[dot..];
    let clean = ext[1..]
        .bytes()
        .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-'));
    if clean {
        ext
    } else {
        ""
    }
}

/// Builds a fresh storage key that keeps the uploaded file's extension.
pub fn destination_key(file_name: &str) -> String {
    format!("{}{}", unique_name(), extension(file_name))
}

/// Returns `true` when `key` names a single flat object.
pub(crate) fn is_flat_key(key: &str) -> bool {
    !key.is_empty() && key != "." && key != ".." && !key.contains(['/', '\\', '\0'])
}
