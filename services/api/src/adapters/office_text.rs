//! services/api/src/adapters/office_text.rs
//!
//! Text extraction for Office Open XML containers (Word and PowerPoint).
//! The container is opened with `zip` and the text runs are read with `quick-xml`.
//! Legacy binary `.doc`/`.ppt` files are not zip archives and fail here.

use std::io::{Cursor, Read, Seek};

use doc_summarizer_core::ports::{PortError, PortResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

const WORD_DOCUMENT_PART: &str = "word/document.xml";
const SLIDE_PREFIX: &str = "ppt/slides/slide";
const WORD_TEXT_RUN: &[u8] = b"w:t";
const DRAWING_TEXT_RUN: &[u8] = b"a:t";

/// Concatenates every text run of a Word document, or of every slide of a
/// presentation, each run followed by a space.
pub fn extract_office_text(data: &[u8]) -> PortResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| PortError::Extraction(format!("Not an Office XML container: {}", e)))?;

    if let Some(xml) = read_part(&mut archive, WORD_DOCUMENT_PART)? {
        return collect_text_runs(&xml, WORD_TEXT_RUN);
    }

    let slides = slide_parts(&archive);
    if slides.is_empty() {
        return Err(PortError::Extraction(
            "Container has neither a Word document nor slides".to_string(),
        ));
    }

    let mut text = String::new();
    for part in slides {
        if let Some(xml) = read_part(&mut archive, &part)? {
            text.push_str(&collect_text_runs(&xml, DRAWING_TEXT_RUN)?);
        }
    }
    Ok(text)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> PortResult<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(PortError::Extraction(format!("Could not open {}: {}", name, e))),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| PortError::Extraction(format!("Could not read {}: {}", name, e)))?;
    Ok(Some(xml))
}

/// Slide parts in presentation order (`slide2.xml` before `slide10.xml`).
fn slide_parts<R: Read + Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix(SLIDE_PREFIX)?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);
    slides.into_iter().map(|(_, name)| name).collect()
}

fn collect_text_runs(xml: &str, run_tag: &[u8]) -> PortResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == run_tag => in_run = true,
            Ok(Event::End(e)) if e.name().as_ref() == run_tag => {
                in_run = false;
                text.push(' ');
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == run_tag => text.push(' '),
            Ok(Event::Text(t)) if in_run => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| PortError::Extraction(format!("Malformed text run: {}", e)))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(PortError::Extraction(format!(
                    "Malformed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(text)
}
