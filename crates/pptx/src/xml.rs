//! Small helpers over `quick-xml` shared by the package and presentation code.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use slidesplit_core::{Error, Result};

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Value of the attribute whose full name is exactly `key`.
pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        })
}

/// Value of a namespaced relationship id attribute (`r:id`).
///
/// The unprefixed `id` attribute is a different attribute and is ignored.
pub(crate) fn rel_id_attr(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| {
            let key = attr.key.as_ref();
            key != b"id" && local_name(key) == b"id"
        })
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Decode a part as UTF-8 XML text.
pub(crate) fn as_xml<'a>(name: &str, data: &'a [u8]) -> Result<&'a str> {
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::XmlError(format!("Part '{}' is not valid UTF-8: {}", name, e)))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Stream `xml` through unchanged, except for elements rejected by `keep`,
/// which are dropped together with their whole subtree.
pub fn retain_elements<F>(xml: &str, mut keep: F) -> Result<String>
where
    F: FnMut(&BytesStart<'_>) -> bool,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::XmlError(format!(
                "Error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Eof => break,
            _ if skip_depth > 0 => match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                _ => {}
            },
            Event::Start(ref e) if !keep(e) => skip_depth = 1,
            Event::Empty(ref e) if !keep(e) => {}
            event => writer
                .write_event(event)
                .map_err(|e| Error::XmlError(format!("Failed to write XML: {}", e)))?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::XmlError(format!("Rewritten XML is not valid UTF-8: {}", e)))
}
