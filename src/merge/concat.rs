//! Page-tree grafting backend.
//!
//! The source document's objects are renumbered past the output's highest
//! id and its root `Pages` node becomes a kid of the output root. Attributes
//! the source pages inherit from their tree stay where they are.

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::merge::backend::{MergeBackend, empty_output, set_page_tree};

/// Backend that grafts whole source page trees.
pub struct ConcatBackend {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    page_count: usize,
}

impl ConcatBackend {
    /// Create a backend with an empty output document.
    pub fn new() -> Self {
        let (doc, pages_id) = empty_output();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            page_count: 0,
        }
    }
}

impl Default for ConcatBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn source_root(doc: &Document) -> Result<(ObjectId, ObjectId)> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|e| CatalogError::merge_failed(format!("Document has no catalog: {e}")))?;
    let pages_id = doc
        .get_dictionary(catalog_id)
        .and_then(|c| c.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| CatalogError::merge_failed(format!("Document has no page tree: {e}")))?;
    Ok((catalog_id, pages_id))
}

impl MergeBackend for ConcatBackend {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn append(&mut self, mut doc: Document) -> Result<usize> {
        let pages = doc.get_pages().len();
        if pages == 0 {
            return Err(CatalogError::merge_failed("Document has no pages"));
        }

        // Fail before renumbering so a broken source changes nothing.
        source_root(&doc)?;

        doc.renumber_objects_with(self.doc.max_id + 1);
        let (catalog_id, root_pages_id) = source_root(&doc)?;

        let root = doc
            .get_object_mut(root_pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| CatalogError::merge_failed(format!("Page tree root is broken: {e}")))?;
        root.set("Parent", self.pages_id);

        doc.objects.remove(&catalog_id);

        debug!(
            first_id = root_pages_id.0,
            max_id = doc.max_id,
            pages,
            "grafting page tree"
        );

        self.doc.max_id = self.doc.max_id.max(doc.max_id);
        self.doc.objects.extend(doc.objects);
        self.kids.push(root_pages_id);
        self.page_count += pages;

        Ok(pages)
    }

    fn page_count(&self) -> usize {
        self.page_count
    }

    fn finish(mut self: Box<Self>) -> Result<Document> {
        if self.page_count == 0 {
            return Err(CatalogError::merge_failed("Nothing was merged"));
        }
        set_page_tree(&mut self.doc, self.pages_id, &self.kids, self.page_count)?;
        Ok(self.doc)
    }
}
