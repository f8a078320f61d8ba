use asciiframe::{ChromeOffsets, FrameError, strip_chrome};

/// Synthetic document matching the structural shape the upstream ANSI-to-SVG
/// renderer emits: viewBox, background rect, title text, window-control
/// group, console-content group.
fn renderer_like_svg() -> String {
    let mut rows = String::new();
    for (i, line) in ["#@*=", "%..:", "-++-"].iter().enumerate() {
        rows.push_str(&format!(
            r##"<text x="0" y="{}" fill="#c5c8c6">{}</text>"##,
            20 * (i + 1),
            line
        ));
    }

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 994 635.6" font-family="monospace">"#,
            "\n",
            r##"  <rect width="100%" height="100%" fill="#1d1f21"/>"##,
            "\n",
            r##"  <text x="497" y="22" text-anchor="middle" fill="#dddddd">asciiframe</text>"##,
            "\n",
            r#"  <g fill-rule="evenodd">"#,
            r##"<circle cx="26" cy="22" r="7" fill="#ff5f57"/>"##,
            r##"<circle cx="48" cy="22" r="7" fill="#febc2e"/>"##,
            r##"<circle cx="70" cy="22" r="7" fill="#28c840"/>"##,
            r#"</g>"#,
            "\n",
            r#"  <g transform="translate(9, 41)">{rows}</g>"#,
            "\n",
            "</svg>"
        ),
        rows = rows
    )
}

#[test]
fn view_box_shrinks_by_the_documented_constants() {
    let out = strip_chrome(&renderer_like_svg(), &ChromeOffsets::default()).unwrap();
    let doc = roxmltree::Document::parse(&out).unwrap();
    // 0+2, 994-19, 635.6-53
    assert_eq!(
        doc.root_element().attribute("viewBox"),
        Some("0 2 975 582.6")
    );
}

#[test]
fn window_controls_group_ends_up_empty_and_content_survives() {
    let out = strip_chrome(&renderer_like_svg(), &ChromeOffsets::default()).unwrap();
    let doc = roxmltree::Document::parse(&out).unwrap();

    let groups: Vec<_> = doc
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "g")
        .collect();
    assert_eq!(groups.len(), 2);

    let controls = groups[0];
    assert_eq!(controls.children().filter(|n| n.is_element()).count(), 0);
    // Untouched attributes of the controls group survive the splice.
    assert_eq!(controls.attribute("fill-rule"), Some("evenodd"));

    let content = groups[1];
    assert_eq!(content.attribute("transform"), Some("translate(0, 0)"));
    let lines: Vec<&str> = content
        .children()
        .filter(|n| n.is_element())
        .filter_map(|n| n.text())
        .collect();
    assert_eq!(lines, vec!["#@*=", "%..:", "-++-"]);
}

#[test]
fn background_and_title_are_made_invisible_not_removed() {
    let out = strip_chrome(&renderer_like_svg(), &ChromeOffsets::default()).unwrap();
    let doc = roxmltree::Document::parse(&out).unwrap();

    let rect = doc
        .descendants()
        .find(|n| n.tag_name().name() == "rect")
        .unwrap();
    assert_eq!(rect.attribute("fill-opacity"), Some("0"));
    assert_eq!(rect.attribute("fill"), Some("#1d1f21"));

    let title = doc
        .descendants()
        .find(|n| n.tag_name().name() == "text")
        .unwrap();
    assert_eq!(title.attribute("fill-opacity"), Some("0"));
    assert_eq!(title.text(), Some("asciiframe"));
}

#[test]
fn reordered_upstream_structure_fails_instead_of_guessing() {
    // Only one group: the renderer layout this stripper is coupled to has
    // changed, so the transform must refuse to edit anything.
    let svg = r#"<svg viewBox="0 0 900 600"><rect/><text>t</text><g><text>art</text></g></svg>"#;
    let err = strip_chrome(svg, &ChromeOffsets::default()).unwrap_err();
    assert!(matches!(err, FrameError::SvgStructure(_)));
}

#[test]
fn stripping_is_idempotent_on_group_count() {
    let once = strip_chrome(&renderer_like_svg(), &ChromeOffsets::default()).unwrap();
    // A second pass still sees the expected structure (two groups) and
    // shrinks the viewBox again; the caller is responsible for applying the
    // transform exactly once per rendered document.
    let twice = strip_chrome(&once, &ChromeOffsets::default()).unwrap();
    let doc = roxmltree::Document::parse(&twice).unwrap();
    assert_eq!(
        doc.root_element().attribute("viewBox"),
        Some("0 4 956 529.6")
    );
}
