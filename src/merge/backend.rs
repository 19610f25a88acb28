//! Merge backend abstraction.

use lopdf::{Document, Object, ObjectId, dictionary};

use crate::config::MergeEngine;
use crate::error::{CatalogError, Result};
use crate::merge::concat::ConcatBackend;
use crate::merge::rebuild::RebuildBackend;

/// Appends whole documents, page by page, to an output document.
///
/// Every backend preserves input order and page order within an input.
pub trait MergeBackend {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Append every page of `doc`. Returns the number of pages appended.
    ///
    /// On error the output is left as it was before the call, apart from
    /// unreachable objects that are pruned when the output is saved.
    fn append(&mut self, doc: Document) -> Result<usize>;

    /// Pages appended so far.
    fn page_count(&self) -> usize;

    /// Finish the page tree and hand out the merged document.
    fn finish(self: Box<Self>) -> Result<Document>;
}

/// Create the backend for `engine`.
pub fn backend_for(engine: MergeEngine) -> Box<dyn MergeBackend> {
    match engine {
        MergeEngine::Concat => Box::new(ConcatBackend::new()),
        MergeEngine::Rebuild => Box::new(RebuildBackend::new()),
    }
}

/// Empty output document: a catalog pointing at an empty root page node.
///
/// Returns the document and the id of its root `Pages` node.
pub(crate) fn empty_output() -> (Document, ObjectId) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    (doc, pages_id)
}

/// Write `kids` and `count` into the root page node.
pub(crate) fn set_page_tree(
    doc: &mut Document,
    pages_id: ObjectId,
    kids: &[ObjectId],
    count: usize,
) -> Result<()> {
    let pages = doc
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| CatalogError::merge_failed(format!("Output page tree is broken: {e}")))?;
    pages.set(
        "Kids",
        kids.iter()
            .map(|id| Object::Reference(*id))
            .collect::<Vec<_>>(),
    );
    pages.set("Count", count as i64);
    Ok(())
}
