//! Document ingestion from a filesystem folder.
//!
//! Supported formats: PDF (one document per file) and DOCX (paragraph text,
//! normalized to lowercase). Files with other extensions are silently
//! skipped. A missing or unreadable folder aborts ingestion.

use crate::types::Document;
use clerk_core::{AppError, AppResult};
use std::io::Read;
use std::path::Path;

/// Load all supported documents from a folder, recursing into subfolders.
///
/// Entries are visited in path order so repeated ingestion runs produce the
/// same document sequence.
pub fn load_folder(folder: &Path) -> AppResult<Vec<Document>> {
    if !folder.is_dir() {
        return Err(AppError::Ingest(format!(
            "Document folder does not exist: {:?}",
            folder
        )));
    }

    let mut entries: Vec<_> = walkdir::WalkDir::new(folder)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    entries.sort();

    let mut docs = Vec::new();

    for path in entries {
        match path.extension().and_then(|e| e.to_str()) {
            Some("pdf") => {
                docs.push(load_pdf(&path)?);
            }
            Some("docx") => {
                docs.push(load_docx(&path)?);
            }
            other => {
                tracing::debug!("Skipping unsupported file {:?} (extension {:?})", path, other);
            }
        }
    }

    tracing::info!("Loaded {} documents from {:?}", docs.len(), folder);
    Ok(docs)
}

/// Extract text from a PDF file. Whole-file granularity.
fn load_pdf(path: &Path) -> AppResult<Document> {
    tracing::debug!("Parsing PDF: {:?}", path);

    let text = pdf_extract::extract_text(path)
        .map_err(|e| AppError::Ingest(format!("Failed to extract text from {:?}: {}", path, e)))?;

    Ok(Document {
        text: normalize_whitespace(&text),
        source: path.to_path_buf(),
        page: None,
    })
}

/// Extract paragraph text from a DOCX file.
///
/// A DOCX is a zip archive; the body lives in `word/document.xml` with text
/// runs inside `<w:t>` elements and paragraphs delimited by `<w:p>`. The
/// result is paragraphs joined with newlines, normalized to lowercase.
fn load_docx(path: &Path) -> AppResult<Document> {
    tracing::debug!("Parsing DOCX: {:?}", path);

    let file = std::fs::File::open(path)
        .map_err(|e| AppError::Ingest(format!("Failed to open {:?}: {}", path, e)))?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| AppError::Ingest(format!("{:?} is not a valid DOCX archive: {}", path, e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AppError::Ingest(format!("{:?} has no document body: {}", path, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| AppError::Ingest(format!("Failed to read {:?}: {}", path, e)))?;

    let text = extract_docx_text(&xml).to_lowercase();

    Ok(Document {
        text,
        source: path.to_path_buf(),
        page: None,
    })
}

/// Pull visible text out of the DOCX body XML.
///
/// Keeps character data only while inside `<w:t>` runs; a closing `</w:p>`
/// becomes a paragraph break.
fn extract_docx_text(xml: &str) -> String {
    let mut result = String::with_capacity(xml.len() / 4);
    let mut rest = xml;
    let mut in_text_run = false;

    while let Some(lt) = rest.find('<') {
        if in_text_run {
            result.push_str(&rest[..lt]);
        }

        let after = &rest[lt + 1..];
        let gt = match after.find('>') {
            Some(i) => i,
            None => break,
        };
        let tag = &after[..gt];

        let self_closing = tag.ends_with('/');
        if (tag == "w:t" || tag.starts_with("w:t ")) && !self_closing {
            in_text_run = true;
        } else if tag == "/w:t" {
            in_text_run = false;
        } else if tag == "/w:p" {
            result.push('\n');
        }

        rest = &after[gt + 1..];
    }

    decode_entities(result.trim_end_matches('\n'))
}

/// Decode the XML entities that matter for plain text.
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}

/// Collapse runs of blank lines and trailing spaces from extracted PDF text.
fn normalize_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(trimmed);
        result.push('\n');
    }

    result.trim().to_string()
}

/// Build a minimal DOCX on disk for tests.
#[cfg(test)]
pub(crate) fn write_test_docx(path: &Path, paragraphs: &[&str]) {
    use std::io::Write;

    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\"?><w:document><w:body>{}</w:body></w:document>",
        body
    );

    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_folder_missing() {
        let result = load_folder(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(AppError::Ingest(_))));
    }

    #[test]
    fn test_load_folder_skips_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "plain text").unwrap();
        std::fs::write(dir.path().join("data.csv"), "a,b").unwrap();
        write_test_docx(&dir.path().join("policy.docx"), &["Refunds need a receipt."]);

        let docs = load_folder(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].source.ends_with("policy.docx"));
    }

    #[test]
    fn test_docx_is_lowercased_and_joined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("handbook.docx");
        write_test_docx(&path, &["Opening Hours", "Weekdays 9 to 5."]);

        let docs = load_folder(dir.path()).unwrap();
        assert_eq!(docs[0].text, "opening hours\nweekdays 9 to 5.");
        assert_eq!(docs[0].page, None);
    }

    #[test]
    fn test_docx_entities_decoded() {
        let dir = tempfile::tempdir().unwrap();
        write_test_docx(
            &dir.path().join("x.docx"),
            &["cash &amp; card accepted"],
        );

        let docs = load_folder(dir.path()).unwrap();
        assert_eq!(docs[0].text, "cash & card accepted");
    }

    #[test]
    fn test_normalize_whitespace() {
        let input = "line one   \n\n\n\nline two\n";
        assert_eq!(normalize_whitespace(input), "line one\n\nline two");
    }
}
