//! Product feed parsing.
//!
//! Walks the feed XML once and pulls a title/id pair out of every `item`
//! element. Items are matched by local name at any depth; `title` and `id`
//! must be direct children of the item and bound to the configured
//! namespace, the way merchant feeds carry `g:title` / `g:id`.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::debug;

use crate::error::{FeedError, FeedResult};
use crate::feed::FeedConfig;
use crate::types::{ProductFeedEntry, ProductIndex};

/// Field of the current item being captured.
enum Field {
    Title,
    Id,
}

/// Parse the feed body into the title → id lookup the matcher uses.
///
/// Duplicate titles keep the id of the last item in document order. Items
/// missing either field, or carrying only whitespace in one, are dropped.
pub fn parse_index(body: &[u8], config: &FeedConfig) -> FeedResult<ProductIndex> {
    let entries = parse_entries(body, config)?;

    let mut index = ProductIndex::new();
    for entry in &entries {
        if let Some(previous) = index.insert(&entry.title, &entry.id) {
            if previous != entry.id {
                debug!(
                    title = %entry.title,
                    previous = %previous,
                    id = %entry.id,
                    "duplicate feed title, keeping last id"
                );
            }
        }
    }

    debug!(entries = entries.len(), indexed = index.len(), "product index built");
    Ok(index)
}

/// Parse the feed body into raw entries, in document order.
///
/// Entries are trimmed; items without a usable title and id are skipped.
/// Within one item the first occurrence of each field wins.
pub fn parse_entries(body: &[u8], config: &FeedConfig) -> FeedResult<Vec<ProductFeedEntry>> {
    let mut reader = NsReader::from_reader(body);
    let namespace = config.namespace.as_bytes();

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    // Depth below the current <item>; 1 means direct child.
    let mut item_depth: Option<usize> = None;
    let mut capture: Option<Field> = None;
    let mut title: Option<String> = None;
    let mut id: Option<String> = None;
    let mut text = String::new();

    loop {
        let (resolve, event) = reader
            .read_resolved_event()
            .map_err(|e| FeedError::Parse(Box::new(e)))?;

        match event {
            Event::Start(start) => {
                if let Some(depth) = item_depth.as_mut() {
                    *depth += 1;
                    if *depth == 1 {
                        capture = field_to_capture(&resolve, start.local_name().as_ref(), namespace, &title, &id);
                        text.clear();
                    }
                } else if start.local_name().as_ref() == b"item" {
                    item_depth = Some(0);
                    title = None;
                    id = None;
                }
            }
            Event::Text(t) => {
                if capture.is_some() {
                    let chunk = t.unescape().map_err(|e| FeedError::Parse(Box::new(e)))?;
                    text.push_str(&chunk);
                }
            }
            Event::CData(c) => {
                if capture.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some(depth) = item_depth.as_mut() {
                    if *depth == 1 {
                        match capture.take() {
                            Some(Field::Title) => title = Some(text.clone()),
                            Some(Field::Id) => id = Some(text.clone()),
                            None => {}
                        }
                    }

                    if *depth == 0 {
                        match take_entry(&mut title, &mut id) {
                            Some(entry) => entries.push(entry),
                            None => skipped += 1,
                        }
                        item_depth = None;
                        capture = None;
                    } else {
                        *depth -= 1;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if skipped > 0 {
        debug!(skipped, "feed items without usable title/id");
    }
    Ok(entries)
}

/// Decide whether an item child starts a title or id capture.
///
/// Only namespace-bound children count, and only while the field is still
/// unset for this item.
fn field_to_capture(
    resolve: &ResolveResult,
    local_name: &[u8],
    namespace: &[u8],
    title: &Option<String>,
    id: &Option<String>,
) -> Option<Field> {
    let ResolveResult::Bound(Namespace(bound)) = resolve else {
        return None;
    };
    if *bound != namespace {
        return None;
    }

    match local_name {
        b"title" if title.is_none() => Some(Field::Title),
        b"id" if id.is_none() => Some(Field::Id),
        _ => None,
    }
}

/// Close out an item: both fields present and non-blank make an entry.
fn take_entry(title: &mut Option<String>, id: &mut Option<String>) -> Option<ProductFeedEntry> {
    let title = title.take()?;
    let id = id.take()?;

    let title = title.trim();
    let id = id.trim();
    if title.is_empty() || id.is_empty() {
        return None;
    }

    Some(ProductFeedEntry {
        title: title.to_string(),
        id: id.to_string(),
    })
}
