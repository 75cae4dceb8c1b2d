//! Username extraction for the search box.
//!
//! Accepted forms:
//! - a bare handle: `torvalds`
//! - an at-handle: `@torvalds`
//! - anything containing `github.com/<handle>`, e.g. a profile or repo URL

/// Longest login GitHub allows.
const MAX_HANDLE_LEN: usize = 39;

const GITHUB_HOST: &str = "github.com/";

/// Check a string against GitHub's login rules: ASCII letters, digits, and
/// single hyphens; must not start or end with a hyphen.
pub fn is_valid_handle(handle: &str) -> bool {
    if handle.is_empty() || handle.len() > MAX_HANDLE_LEN {
        return false;
    }
    if handle.starts_with('-') || handle.ends_with('-') || handle.contains("--") {
        return false;
    }
    handle.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Pull a username out of free text. Returns `None` when nothing valid is found.
pub fn extract_username(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    // ASCII lowercasing keeps byte offsets aligned with `trimmed`.
    let lowered = trimmed.to_ascii_lowercase();
    if let Some(pos) = lowered.find(GITHUB_HOST) {
        let rest = &trimmed[pos + GITHUB_HOST.len()..];
        let handle = rest.split(['/', '?', '#']).next().unwrap_or_default();
        return is_valid_handle(handle).then(|| handle.to_string());
    }

    let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);
    is_valid_handle(handle).then(|| handle.to_string())
}

/// Path of the details page for `username`.
pub fn details_path(username: &str) -> String {
    format!("/details/{}", urlencoding::encode(username))
}
