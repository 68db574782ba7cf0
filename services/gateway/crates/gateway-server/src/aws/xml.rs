//! Minimal XML text extraction for S3 and EC2 responses.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::UpstreamError;

/// Collects the text of every element whose open-element path ends with
/// `suffix`, in document order.
///
/// `texts_at(xml, &["Contents", "Key"])` yields every listed key of a
/// `ListObjectsV2` result regardless of the root element name.
pub fn texts_at(
    service: &'static str,
    xml: &str,
    suffix: &[&str],
) -> Result<Vec<String>, UpstreamError> {
    let parse_err = |reason: String| UpstreamError::Parse { service, reason };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut found = Vec::new();
    loop {
        match reader.read_event().map_err(|e| parse_err(e.to_string()))? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                stack.push(name);
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Empty(empty) => {
                stack.push(String::from_utf8_lossy(empty.local_name().as_ref()).into_owned());
                if ends_with(&stack, suffix) {
                    found.push(String::new());
                }
                stack.pop();
            }
            Event::Text(text) if ends_with(&stack, suffix) => {
                let value = text.unescape().map_err(|e| parse_err(e.to_string()))?;
                found.push(value.into_owned());
            }
            Event::CData(data) if ends_with(&stack, suffix) => {
                found.push(String::from_utf8_lossy(&data.into_inner()).into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(found)
}

fn ends_with(stack: &[String], suffix: &[&str]) -> bool {
    stack.len() >= suffix.len()
        && stack[stack.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(have, want)| have == want)
}

/// Escapes text for inclusion in an XML element body.
#[must_use]
pub fn escape(value: &str) -> String {
    quick_xml::escape::escape(value).into_owned()
}
