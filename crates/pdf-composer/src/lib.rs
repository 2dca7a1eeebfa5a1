//! PDF page utilities used by the texsplit pipeline.
//!
//! This crate provides the low-level page primitives using lopdf:
//! - Page counting
//! - Splitting a document into one file per page
//! - Merging an ordered list of single-page files into one document
//!
//! Pages are moved between documents by deep-copying their object graph
//! with cycle detection. Attributes a page inherits from its page tree
//! (`MediaBox`, `Resources`, ...) are materialized onto the page before it
//! is detached from its parent.

mod error;

pub use error::ComposerError;

use lopdf::{Document, Object, ObjectId, dictionary};
use log::{debug, trace};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Page attributes that may be inherited from an ancestor `Pages` node.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Upper bound on page tree depth when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// The file name used for a single extracted page.
///
/// Both [`split_into_pages`] and the callers that later merge those pages
/// rely on this naming.
pub fn page_file_name(stem: &str, page: u32) -> String {
    format!("{}_{}.pdf", stem, page)
}

/// A helper struct to manage the state of copying objects between documents.
struct ObjectCopier<'a> {
    source_doc: &'a Document,
    target_doc: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source_doc: &'a Document, target_doc: &'a mut Document) -> Self {
        Self { source_doc, target_doc, id_map: HashMap::new() }
    }

    /// Copies a page dictionary detached from its source page tree.
    ///
    /// Inherited attributes are pulled down onto the copy and the `Parent`
    /// link is dropped; the caller attaches the page to the target tree.
    fn copy_page(&mut self, page_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&page_id) {
            return Ok(*target_id);
        }

        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(page_id, new_id);

        let mut page = self.source_doc.get_dictionary(page_id)?.clone();
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Some(value) = self.inherited_attribute(page_id, key) {
                    page.set(key.to_vec(), value);
                }
            }
        }
        page.remove(b"Parent");

        let new_obj = self.remap_references(Object::Dictionary(page))?;
        self.replace_placeholder(new_id, new_obj)?;
        Ok(new_id)
    }

    /// Deep copies an object from the source document to the target document.
    /// It recursively copies all referenced objects, ensuring that each object
    /// is only copied once by tracking it in the `id_map`.
    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the target id before recursing so that cycles
        // (e.g. Annot -> P -> Annots -> Annot) terminate.
        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source_doc.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;
        self.replace_placeholder(new_id, new_obj)?;
        Ok(new_id)
    }

    fn replace_placeholder(&mut self, id: ObjectId, obj: Object) -> Result<(), lopdf::Error> {
        match self.target_doc.objects.get_mut(&id) {
            Some(target_obj) => {
                *target_obj = obj;
                Ok(())
            }
            None => Err(lopdf::Error::ObjectNotFound(id)),
        }
    }

    /// Traverses an object and replaces any `Object::Reference` with a new ID
    /// from the target document by recursively calling `copy_object`.
    fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => {
                // A reference to a page (or page tree node) that is not being
                // copied would drag the whole source tree along with it.
                if !self.id_map.contains_key(&id) && self.is_page_tree_node(id) {
                    trace!("Dropping reference to foreign page tree node {:?}", id);
                    return Ok(Object::Null);
                }
                let new_id = self.copy_object(id)?;
                Ok(Object::Reference(new_id))
            }
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }

    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut current = self
            .source_doc
            .get_dictionary(page_id)
            .ok()?
            .get(b"Parent")
            .and_then(Object::as_reference)
            .ok()?;

        for _ in 0..MAX_TREE_DEPTH {
            let node = self.source_doc.get_dictionary(current).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
            current = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        }
        None
    }

    fn is_page_tree_node(&self, id: ObjectId) -> bool {
        self.source_doc
            .get_dictionary(id)
            .ok()
            .and_then(|dict| dict.get(b"Type").ok())
            .and_then(|ty| ty.as_name().ok())
            .is_some_and(|name| name == b"Page" || name == b"Pages")
    }
}

/// Creates an empty document with a catalog and an empty page tree.
fn new_document(version: &str) -> Document {
    let mut doc = Document::with_version(version);
    let pages_id = doc.new_object_id();
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0_i64,
    };
    doc.objects.insert(pages_id, pages_dict.into());

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn load(path: &Path) -> Result<Document, ComposerError> {
    Document::load(path).map_err(|source| ComposerError::Load { path: path.to_path_buf(), source })
}

/// Appends the given pages of `source`, in the given order, to the end of
/// `target`'s page tree.
///
/// Each page is copied together with every object it references (content
/// streams, resources, fonts, ...), under fresh object ids.
pub fn append_pages(
    target: &mut Document,
    source: &Document,
    page_ids: &[ObjectId],
) -> Result<(), ComposerError> {
    if page_ids.is_empty() {
        return Ok(());
    }

    let mut copier = ObjectCopier::new(source, target);
    let mut copied_page_ids = Vec::with_capacity(page_ids.len());
    for &page_id in page_ids {
        copied_page_ids.push(copier.copy_page(page_id)?);
    }

    let root_id = target.trailer.get(b"Root")?.as_reference()?;
    let pages_id = target.get_dictionary(root_id)?.get(b"Pages")?.as_reference()?;
    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;

    let mut kids = pages_dict.get(b"Kids")?.as_array()?.clone();
    let original_count = pages_dict.get(b"Count")?.as_i64()?;
    kids.extend(copied_page_ids.iter().map(|id| Object::Reference(*id)));

    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", original_count + copied_page_ids.len() as i64);

    for page_id in copied_page_ids {
        if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(page_id) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(())
}

/// Appends every page of `source`, in page order, to `target`.
pub fn append_document(target: &mut Document, source: &Document) -> Result<(), ComposerError> {
    let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
    append_pages(target, source, &page_ids)
}

/// Returns the number of pages in the PDF at `path`.
pub fn page_count(path: &Path) -> Result<u32, ComposerError> {
    let doc = load(path)?;
    let count = doc.get_pages().len();
    u32::try_from(count).map_err(|_| ComposerError::Other(format!("{} has too many pages ({})", path.display(), count)))
}

/// Splits the PDF at `path` into one file per page inside `dest_dir`.
///
/// Page `n` is written to `dest_dir/<stem>_<n>.pdf` (see [`page_file_name`]).
/// Returns the written paths in page order.
pub fn split_into_pages(path: &Path, dest_dir: &Path, stem: &str) -> Result<Vec<PathBuf>, ComposerError> {
    let source = load(path)?;
    let pages = source.get_pages();
    debug!("Splitting {} ({} pages) into {}", path.display(), pages.len(), dest_dir.display());

    let mut written = Vec::with_capacity(pages.len());
    for (number, page_id) in pages {
        let mut single = new_document(&source.version);
        append_pages(&mut single, &source, &[page_id])?;

        let out = dest_dir.join(page_file_name(stem, number));
        single.save(&out)?;
        trace!("Wrote page {} to {}", number, out.display());
        written.push(out);
    }
    Ok(written)
}

/// Merges the pages of `files`, in order, into a new document at `dest`.
///
/// Fails with [`ComposerError::EmptyMerge`] when `files` is empty, and with
/// [`ComposerError::Load`] when any input cannot be read.
pub fn merge_pages<P: AsRef<Path>>(files: &[P], dest: &Path) -> Result<PathBuf, ComposerError> {
    let mut merged: Option<Document> = None;
    for file in files {
        let source = load(file.as_ref())?;
        let target = merged.get_or_insert_with(|| new_document(&source.version));
        append_document(target, &source)?;
    }

    let Some(mut merged) = merged else {
        return Err(ComposerError::EmptyMerge(dest.to_path_buf()));
    };
    merged.save(dest)?;
    debug!("Merged {} file(s) into {}", files.len(), dest.display());
    Ok(dest.to_path_buf())
}
