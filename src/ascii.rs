/// Art glyphs emitted by the simple converter character set. Stripping them
/// leaves only the background-color blocks behind.
pub const ART_GLYPHS: [char; 9] = ['*', '#', '+', '=', '%', '@', '.', '-', ':'];

/// Replace every art glyph with a space, leaving all other characters —
/// including whitespace, line breaks, and ANSI escape sequences — untouched.
pub fn strip_art_glyphs(text: &str) -> String {
    text.chars()
        .map(|c| if ART_GLYPHS.contains(&c) { ' ' } else { c })
        .collect()
}
