//! Parser for the LOD Cloud topic diagrams.
//!
//! Each diagram is an SVG document where every dataset bubble is a `<g>`
//! element with an `<a href="…/dataset/<id>">` child. The dataset id is the
//! last path segment of the link.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::QualityResult;

struct OpenElement {
    is_group: bool,
    linked: bool,
}

/// Extract the first link of every `<g>` element that has an `<a>` child.
pub fn extract_topic_links(svg: &str) -> QualityResult<Vec<String>> {
    let mut reader = Reader::from_str(svg);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut links = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let is_anchor = e.local_name().as_ref() == b"a";
                if is_anchor {
                    record_link(&e, &mut stack, &mut links)?;
                }
                stack.push(OpenElement {
                    is_group: e.local_name().as_ref() == b"g",
                    linked: false,
                });
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"a" {
                    record_link(&e, &mut stack, &mut links)?;
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(links)
}

fn record_link(
    anchor: &BytesStart<'_>,
    stack: &mut [OpenElement],
    links: &mut Vec<String>,
) -> QualityResult<()> {
    let Some(parent) = stack.last_mut() else {
        return Ok(());
    };
    if !parent.is_group || parent.linked {
        return Ok(());
    }

    for attr in anchor.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == b"href" {
            let href = attr.unescape_value()?.trim().to_string();
            if !href.is_empty() {
                parent.linked = true;
                links.push(href);
            }
            break;
        }
    }
    Ok(())
}

/// Dataset id referenced by a diagram link.
pub fn entity_id_from_link(link: &str) -> String {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(link)
        .to_string()
}

/// Topic name of a diagram URL, e.g. `…/latest/life-sciences-lod.svg` → `life-sciences`.
pub fn topic_from_url(url: &str) -> String {
    let file = url.rsplit('/').next().unwrap_or(url);
    let stem = file.split('.').next().unwrap_or(file);
    stem.replace("-lod", "")
}
