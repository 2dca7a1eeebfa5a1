use lopdf::Document as LopdfDocument;
use std::path::Path;

/// The raw content stream of every page, in page order.
pub fn page_contents(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let doc = LopdfDocument::load(path)?;
    let mut contents = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let content = doc.get_page_content(page_id)?;
        contents.push(String::from_utf8_lossy(&content).into_owned());
    }
    Ok(contents)
}

/// Asserts that the PDF at `path` holds exactly the simulated pages
/// `expected`, in order.
pub fn assert_pages(path: &Path, expected: &[u32]) {
    let contents = page_contents(path).unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
    assert_eq!(contents.len(), expected.len(), "page count of {}", path.display());
    for (content, page) in contents.iter().zip(expected) {
        let marker = format!("(page {})", page);
        assert!(content.contains(&marker), "{} should hold page {}, got {:?}", path.display(), page, content);
    }
}
