use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    config::ChromeOffsets,
    error::{FrameError, FrameResult},
};

/// Suffix appended to the file stem of a chrome-stripped SVG.
pub const OPTIMIZED_SUFFIX: &str = "-optimized";

/// Strip the decorative terminal-window frame out of a rendered SVG.
///
/// The input must match the structural shape one specific ANSI-to-SVG
/// renderer emits: a root `<svg>` with a `viewBox`, a background `<rect>`
/// and a title-bar `<text>` ahead of the groups, and at least two `<g>`
/// children of the root where the second-to-last holds the window-control
/// circles and the last holds the console content.
///
/// Edits, in order: shrink the viewBox by the configured offsets, reset the
/// content group's transform to the origin, delete every child of the
/// window-controls group, and force `fill-opacity="0"` on the background
/// rect and title text. Any structural mismatch is an error; this function
/// must never guess which element is which.
pub fn strip_chrome(svg: &str, offsets: &ChromeOffsets) -> FrameResult<String> {
    let doc = roxmltree::Document::parse(svg)
        .map_err(|e| FrameError::svg_structure(format!("failed to parse svg: {e}")))?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(FrameError::svg_structure(format!(
            "root element is <{}>, expected <svg>",
            root.tag_name().name()
        )));
    }

    let groups: Vec<roxmltree::Node> = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "g")
        .collect();
    if groups.len() < 2 {
        return Err(FrameError::svg_structure(format!(
            "expected at least two <g> children of <svg>, found {}",
            groups.len()
        )));
    }
    let controls = groups[groups.len() - 2];
    let content = groups[groups.len() - 1];

    let rect = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "rect")
        .ok_or_else(|| FrameError::svg_structure("no background <rect> found"))?;
    let title = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "text")
        .ok_or_else(|| FrameError::svg_structure("no title <text> found"))?;

    // The background and title must precede the chrome groups; a <rect> or
    // <text> first appearing inside the groups means the upstream layout
    // changed and editing it would hit an unrelated element.
    for (what, node) in [("background <rect>", rect), ("title <text>", title)] {
        if node.range().start >= controls.range().start {
            return Err(FrameError::svg_structure(format!(
                "{what} appears inside the chrome groups; upstream svg layout changed"
            )));
        }
    }

    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    // (1) viewBox shrink.
    let view_box = root
        .attribute("viewBox")
        .ok_or_else(|| FrameError::svg_structure("svg root has no viewBox attribute"))?;
    let new_view_box = shrink_view_box(view_box, offsets)?;
    let svg_tag = open_tag_span(svg, root)?;
    let new_tag = set_attr(&svg[svg_tag.clone()], "viewBox", &new_view_box, false)?;
    edits.push((svg_tag, new_tag));

    // (2) content starts at the origin.
    let content_tag = open_tag_span(svg, content)?;
    let new_tag = set_attr(&svg[content_tag.clone()], "transform", "translate(0, 0)", true)?;
    edits.push((content_tag, new_tag));

    // (3) window-control elements removed.
    let controls_range = controls.range();
    let controls_tag = open_tag_span(svg, controls)?;
    let tag_text = &svg[controls_tag];
    let emptied = if tag_text.ends_with("/>") {
        tag_text.to_string()
    } else {
        format!("{tag_text}</g>")
    };
    edits.push((controls_range, emptied));

    // (4) + (5) background and title made invisible.
    for node in [rect, title] {
        let tag = open_tag_span(svg, node)?;
        let new_tag = set_attr(&svg[tag.clone()], "fill-opacity", "0", true)?;
        edits.push((tag, new_tag));
    }

    let out = apply_edits(svg, edits)?;

    // The splices are textual; prove the result is still well-formed.
    roxmltree::Document::parse(&out)
        .map_err(|e| FrameError::svg_structure(format!("stripped svg is not well-formed: {e}")))?;
    Ok(out)
}

/// Strip `path` and write the result next to it as `<stem>-optimized.svg`,
/// leaving the original untouched.
pub fn strip_chrome_file(path: &Path, offsets: &ChromeOffsets) -> FrameResult<PathBuf> {
    let svg = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read svg '{}'", path.display()))?;
    let stripped = strip_chrome(&svg, offsets)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| FrameError::validation(format!("bad svg path '{}'", path.display())))?;
    let out = path.with_file_name(format!("{stem}{OPTIMIZED_SUFFIX}.svg"));
    std::fs::write(&out, stripped)
        .with_context(|| format!("failed to write '{}'", out.display()))?;
    Ok(out)
}

fn shrink_view_box(view_box: &str, offsets: &ChromeOffsets) -> FrameResult<String> {
    let parts: Vec<f64> = view_box
        .split_whitespace()
        .map(|p| p.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| FrameError::svg_structure(format!("malformed viewBox '{view_box}'")))?;
    let [x, y, w, h] = parts[..] else {
        return Err(FrameError::svg_structure(format!(
            "viewBox '{view_box}' does not have four numbers"
        )));
    };

    let (new_y, new_w, new_h) = (y + offsets.top, w + offsets.width, h + offsets.height);
    if new_w <= 0.0 || new_h <= 0.0 {
        return Err(FrameError::svg_structure(format!(
            "viewBox '{view_box}' is too small to crop by {offsets:?}"
        )));
    }
    Ok(format!("{x} {new_y} {new_w} {new_h}"))
}

/// Byte span of an element's open tag (`<name ...>` or `<name .../>`),
/// tolerating `>` inside quoted attribute values.
fn open_tag_span(src: &str, node: roxmltree::Node) -> FrameResult<Range<usize>> {
    let start = node.range().start;
    let bytes = src.as_bytes();
    if bytes.get(start) != Some(&b'<') {
        return Err(FrameError::svg_structure(
            "element range does not start at '<' (parser inconsistency)",
        ));
    }

    let mut quote: Option<u8> = None;
    for (i, &b) in bytes[start..].iter().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(b),
            (None, b'>') => return Ok(start..start + i + 1),
            _ => {}
        }
    }
    Err(FrameError::svg_structure("unterminated open tag"))
}

/// Return `tag` with attribute `name` set to `value`. Replaces an existing
/// double-quoted attribute; inserts one before the closing when absent and
/// `insert_if_missing` is set, errors otherwise.
fn set_attr(tag: &str, name: &str, value: &str, insert_if_missing: bool) -> FrameResult<String> {
    if let Some(span) = find_attr_value_span(tag, name) {
        let mut out = String::with_capacity(tag.len() + value.len());
        out.push_str(&tag[..span.start]);
        out.push_str(value);
        out.push_str(&tag[span.end..]);
        return Ok(out);
    }

    if !insert_if_missing {
        return Err(FrameError::svg_structure(format!(
            "open tag has no {name} attribute: {tag}"
        )));
    }

    let insert_at = if tag.ends_with("/>") {
        tag.len() - 2
    } else if tag.ends_with('>') {
        tag.len() - 1
    } else {
        return Err(FrameError::svg_structure("open tag does not end with '>'"));
    };
    let mut out = String::with_capacity(tag.len() + name.len() + value.len() + 4);
    out.push_str(tag[..insert_at].trim_end());
    out.push_str(&format!(" {name}=\"{value}\""));
    out.push_str(&tag[insert_at..]);
    Ok(out)
}

fn find_attr_value_span(tag: &str, name: &str) -> Option<Range<usize>> {
    let needle = format!("{name}=\"");
    let mut from = 0;
    while let Some(rel) = tag[from..].find(&needle) {
        let at = from + rel;
        let preceded_by_space = tag[..at].ends_with(|c: char| c.is_whitespace());
        if preceded_by_space {
            let value_start = at + needle.len();
            let value_end = value_start + tag[value_start..].find('"')?;
            return Some(value_start..value_end);
        }
        from = at + needle.len();
    }
    None
}

fn apply_edits(src: &str, mut edits: Vec<(Range<usize>, String)>) -> FrameResult<String> {
    edits.sort_by_key(|(range, _)| range.start);
    for pair in edits.windows(2) {
        if pair[0].0.end > pair[1].0.start {
            return Err(FrameError::svg_structure(
                "overlapping svg edits; upstream svg layout changed",
            ));
        }
    }

    let mut out = src.to_string();
    for (range, replacement) in edits.into_iter().rev() {
        out.replace_range(range, &replacement);
    }
    Ok(out)
}
