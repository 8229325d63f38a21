use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::{RebrandError, Result};

pub fn value_from_json_file(key: &str, json_file: &Path) -> Result<Option<String>> {
    let content = fs::read_to_string(json_file)?;
    let document: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| RebrandError::Json {
            path: json_file.to_path_buf(),
            source,
        })?;

    let value = document
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    debug!("JSON {:?} [{}] = {:?}", json_file, key, value);

    Ok(value)
}

/// Reads attribute `attr` from the first `tag` element of an XML document.
pub fn value_from_xml_file(tag: &str, attr: &str, xml_file: &Path) -> Result<Option<String>> {
    let content = fs::read_to_string(xml_file)?;
    let xml_error = |message: String| RebrandError::Xml {
        path: xml_file.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(&content);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == tag.as_bytes() => {
                for attribute in e.attributes() {
                    let attribute = attribute.map_err(|e| xml_error(e.to_string()))?;
                    if attribute.key.as_ref() == attr.as_bytes() {
                        let value = attribute
                            .unescape_value()
                            .map_err(|e| xml_error(e.to_string()))?;
                        debug!("XML {:?} <{} {}> = {:?}", xml_file, tag, attr, value);
                        return Ok(Some(value.into_owned()));
                    }
                }
                return Ok(None);
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(xml_error(e.to_string())),
            _ => {}
        }
    }
}
