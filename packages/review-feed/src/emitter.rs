//! Output document emission.
//!
//! Serializes matched records into the `reviews` XML document. Element
//! layout beyond well-formedness is not contractual, but stays stable for
//! downstream ingestion; every text-bearing leaf escapes `& < > " '`.

use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::error::{GenerateError, Result};
use crate::types::ReviewRecord;

/// MIME type of the emitted buffer.
pub const FEED_MIME_TYPE: &str = "application/xml";

/// Conventional filename for the emitted buffer.
pub const FEED_FILENAME: &str = "reviews.xml";

/// Serialize records into the final UTF-8 document.
pub fn write_feed(records: &[ReviewRecord]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(emit_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("reviews")))
        .map_err(emit_error)?;

    for record in records {
        write_review(&mut writer, record).map_err(emit_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("reviews")))
        .map_err(emit_error)?;

    let buffer = writer.into_inner();
    debug!(reviews = records.len(), bytes = buffer.len(), "review document emitted");
    Ok(buffer)
}

fn write_review<W: io::Write>(writer: &mut Writer<W>, record: &ReviewRecord) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("review")))?;

    text_element(writer, "review_id", &record.review_id)?;

    writer.write_event(Event::Start(BytesStart::new("reviewer")))?;
    text_element(writer, "name", &record.reviewer)?;
    writer.write_event(Event::End(BytesEnd::new("reviewer")))?;

    text_element(writer, "review_timestamp", &record.review_timestamp)?;
    text_element(writer, "title", &record.title)?;
    text_element(writer, "content", &record.content)?;
    text_element(writer, "review_rating", &record.review_rating.to_string())?;

    writer.write_event(Event::Start(BytesStart::new("product_ids")))?;
    text_element(writer, "product_id", &record.product_id)?;
    writer.write_event(Event::End(BytesEnd::new("product_ids")))?;

    writer.write_event(Event::End(BytesEnd::new("review")))?;
    Ok(())
}

/// One leaf element; the text event escapes markup-significant characters.
fn text_element<W: io::Write>(writer: &mut Writer<W>, name: &str, value: &str) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn emit_error(e: io::Error) -> GenerateError {
    GenerateError::Emit(Box::new(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ReviewRecord {
        ReviewRecord {
            review_id: "7e3a1a44-0000-4000-8000-000000000001".to_string(),
            reviewer: "Ana".to_string(),
            review_timestamp: "2024-05-15T12:30:00".to_string(),
            title: String::new(),
            content: "Great mug!".to_string(),
            review_rating: 5,
            product_id: "1001".to_string(),
        }
    }

    #[test]
    fn test_single_record_document_layout() {
        let xml = write_feed(&[record()]).unwrap();

        assert_eq!(
            String::from_utf8(xml).unwrap(),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <reviews>\
             <review>\
             <review_id>7e3a1a44-0000-4000-8000-000000000001</review_id>\
             <reviewer><name>Ana</name></reviewer>\
             <review_timestamp>2024-05-15T12:30:00</review_timestamp>\
             <title></title>\
             <content>Great mug!</content>\
             <review_rating>5</review_rating>\
             <product_ids><product_id>1001</product_id></product_ids>\
             </review>\
             </reviews>"
        );
    }

    #[test]
    fn test_empty_records_emit_bare_root() {
        let xml = write_feed(&[]).unwrap();

        assert_eq!(
            String::from_utf8(xml).unwrap(),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?><reviews></reviews>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let mut reviewer = record();
        reviewer.reviewer = "R&D <\"lab\">".to_string();
        reviewer.content = "it's 'fine'".to_string();

        let xml = String::from_utf8(write_feed(&[reviewer]).unwrap()).unwrap();

        assert!(xml.contains("<name>R&amp;D &lt;&quot;lab&quot;&gt;</name>"));
        assert!(xml.contains("<content>it&apos;s &apos;fine&apos;</content>"));
        assert!(!xml.contains("<\"lab\">"));
    }

    #[test]
    fn test_multiple_records_in_order() {
        let mut second = record();
        second.product_id = "2002".to_string();

        let xml = String::from_utf8(write_feed(&[record(), second]).unwrap()).unwrap();

        assert_eq!(xml.matches("<review>").count(), 2);
        let first_pos = xml.find("<product_id>1001</product_id>").unwrap();
        let second_pos = xml.find("<product_id>2002</product_id>").unwrap();
        assert!(first_pos < second_pos);
    }

    #[test]
    fn test_unicode_text_passes_through() {
        let mut rec = record();
        rec.reviewer = "منى".to_string();
        rec.content = "قهوة ممتازة ☕".to_string();

        let xml = String::from_utf8(write_feed(&[rec]).unwrap()).unwrap();

        assert!(xml.contains("<name>منى</name>"));
        assert!(xml.contains("<content>قهوة ممتازة ☕</content>"));
    }
}
