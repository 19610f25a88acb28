//! Deep-copy backend.
//!
//! Each page is copied into the output together with every object it
//! reaches. Inherited attributes are resolved onto the page itself, so the
//! output page tree is flat. References that cannot be resolved become
//! `null` instead of failing the document, which lets this backend cope with
//! damaged files the grafting backend rejects.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::merge::backend::{MergeBackend, empty_output, set_page_tree};

/// Page attributes a page may inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Maximum depth followed when walking up a page tree.
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, used when a page has no media box anywhere in its tree.
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// Backend that copies pages one by one into a fresh page tree.
pub struct RebuildBackend {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl RebuildBackend {
    /// Create a backend with an empty output document.
    pub fn new() -> Self {
        let (doc, pages_id) = empty_output();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }
}

impl Default for RebuildBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn is_pages_node(obj: &Object) -> bool {
    let dict = match obj {
        Object::Dictionary(dict) => dict,
        _ => return false,
    };
    matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"Pages")
}

/// Copies objects from one document into another, remembering where each
/// source object landed.
struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source: &'a Document, target: &'a mut Document) -> Self {
        Self {
            source,
            target,
            id_map: HashMap::new(),
        }
    }

    /// Allocate an output id for `source_id` without copying it yet.
    fn reserve(&mut self, source_id: ObjectId) -> ObjectId {
        if let Some(id) = self.id_map.get(&source_id) {
            return *id;
        }
        let id = self.target.new_object_id();
        self.id_map.insert(source_id, id);
        id
    }

    fn copy_reference(&mut self, source_id: ObjectId) -> Object {
        if let Some(id) = self.id_map.get(&source_id) {
            return Object::Reference(*id);
        }

        let source = self.source;
        let object = match source.get_object(source_id) {
            Ok(object) => object,
            Err(_) => {
                debug!(id = ?source_id, "replacing dangling reference with null");
                return Object::Null;
            }
        };

        // Page tree nodes are rebuilt, never copied.
        if is_pages_node(object) {
            return Object::Null;
        }

        let id = self.reserve(source_id);
        let copied = self.copy_value(object);
        self.target.objects.insert(id, copied);
        Object::Reference(id)
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            copied.set(key.clone(), self.copy_value(value));
        }
        copied
    }

    fn copy_value(&mut self, value: &Object) -> Object {
        match value {
            Object::Reference(id) => self.copy_reference(*id),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_value(item)).collect())
            }
            Object::Stream(stream) => {
                let mut copied = stream.clone();
                copied.dict = self.copy_dictionary(&stream.dict);
                Object::Stream(copied)
            }
            other => other.clone(),
        }
    }

    /// Find `key` on the page or the closest ancestor that defines it.
    fn inherited(&self, page: &Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        for _ in 0..MAX_TREE_DEPTH {
            let node = self.source.get_dictionary(parent?).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value);
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }

    /// Copy one page under `parent_id`, returning its output id.
    fn copy_page(&mut self, page_id: ObjectId, parent_id: ObjectId) -> Result<ObjectId> {
        let source = self.source;
        let page = source.get_dictionary(page_id).map_err(|e| {
            CatalogError::merge_failed(format!("Page {page_id:?} is not a dictionary: {e}"))
        })?;

        let mut copied = Dictionary::new();
        for (key, value) in page.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            copied.set(key.clone(), self.copy_value(value));
        }

        for key in INHERITABLE {
            if copied.has(key) {
                continue;
            }
            if let Some(value) = self.inherited(page, key) {
                let value = self.copy_value(value);
                copied.set(key.to_vec(), value);
            }
        }

        if !copied.has(b"MediaBox") {
            copied.set(
                "MediaBox",
                DEFAULT_MEDIA_BOX
                    .iter()
                    .map(|v| Object::Integer(*v))
                    .collect::<Vec<_>>(),
            );
        }

        copied.set("Type", Object::Name(b"Page".to_vec()));
        copied.set("Parent", parent_id);

        let id = self.reserve(page_id);
        self.target.objects.insert(id, Object::Dictionary(copied));
        Ok(id)
    }
}

impl MergeBackend for RebuildBackend {
    fn name(&self) -> &'static str {
        "rebuild"
    }

    fn append(&mut self, doc: Document) -> Result<usize> {
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(CatalogError::merge_failed("Document has no pages"));
        }

        let mut copier = ObjectCopier::new(&doc, &mut self.doc);

        // Links between pages must resolve to the copies, not to new objects.
        for page_id in &page_ids {
            copier.reserve(*page_id);
        }

        let mut new_kids = Vec::with_capacity(page_ids.len());
        for page_id in &page_ids {
            new_kids.push(copier.copy_page(*page_id, self.pages_id)?);
        }

        debug!(
            pages = new_kids.len(),
            objects = copier.id_map.len(),
            "copied pages"
        );

        let appended = new_kids.len();
        self.kids.extend(new_kids);
        Ok(appended)
    }

    fn page_count(&self) -> usize {
        self.kids.len()
    }

    fn finish(mut self: Box<Self>) -> Result<Document> {
        if self.kids.is_empty() {
            return Err(CatalogError::merge_failed("Nothing was merged"));
        }
        let count = self.kids.len();
        set_page_tree(&mut self.doc, self.pages_id, &self.kids, count)?;
        Ok(self.doc)
    }
}
