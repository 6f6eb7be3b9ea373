use std::path::Path;

use lopdf::Document;

use crate::error::{PdfProcessError, Result};

pub(crate) fn load_from_path(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(PdfProcessError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    Document::load(path).map_err(|e| PdfProcessError::Parse(e.to_string()))
}

pub(crate) fn load_from_bytes(bytes: &[u8]) -> Result<Document> {
    Document::load_mem(bytes).map_err(|e| PdfProcessError::Parse(e.to_string()))
}

/// Text of every page in page order. Pages whose text cannot be decoded come back empty.
pub(crate) fn page_texts(doc: &Document) -> Vec<String> {
    let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();

    page_numbers
        .into_iter()
        .map(|page_number| {
            doc.extract_text(&[page_number]).unwrap_or_else(|err| {
                tracing::debug!(page = page_number, error = %err, "page has no extractable text");
                String::new()
            })
        })
        .collect()
}

/// Concatenates page texts, each followed by a newline, skipping empty pages.
///
/// Whitespace-only pages are kept as they are.
pub(crate) fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for page in pages {
        let page = page.as_ref();
        if page.is_empty() {
            continue;
        }
        out.push_str(page);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_skips_only_empty_pages() {
        let joined = join_pages(["first page", "", "  \n", "third page"]);
        assert_eq!(joined, "first page\n  \n\nthird page\n");
    }

    #[test]
    fn join_of_nothing_is_empty() {
        assert_eq!(join_pages(Vec::<String>::new()), "");
    }
}
