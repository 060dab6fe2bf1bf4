//! Cleanup for text decoded out of replay blobs.

/// Markup the game client embeds in player-visible names
const SPACE_MARKUP: &str = "<sp/>";

/// Replace embedded `<sp/>` markup with a plain space
pub fn strip_markup(text: &str) -> String {
    text.replace(SPACE_MARKUP, " ")
}

/// Trim NUL padding from both ends
pub fn strip_nul(text: &str) -> &str {
    text.trim_matches('\0')
}

/// Decode a name blob: lossy UTF-8, NUL padding trimmed, markup replaced
pub fn clean_name(bytes: &[u8]) -> String {
    strip_markup(strip_nul(&String::from_utf8_lossy(bytes)))
}
