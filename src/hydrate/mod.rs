//! Model hydration: from the untyped raw tree to the typed document graph.
//!
//! Every document type declares its template through the [`Document`] trait:
//! the keys it accepts and a constructor reading them from sealed
//! [`Fields`]. Hydration walks the raw tree top-down:
//!
//! 1. the raw object is sealed: a key the template does not declare fails
//!    with [`HydrationError::UnexpectedKey`];
//! 2. each declared key is read: nested documents are hydrated recursively,
//!    repeated documents element by element, scalars are type checked and
//!    assigned unchanged; a required key that is absent fails with
//!    [`HydrationError::MissingKey`];
//! 3. the finished value is immutable: document types have private fields
//!    and no mutating methods, and nested documents are complete before
//!    their parent is built.
//!
//! [`Instance`] is the write-once slot a document is hydrated into.
//! Hydrating into an occupied slot is a programming error and fails with
//! [`HydrationError::AlreadyFrozen`].

mod error;
mod fields;

use once_cell::sync::OnceCell;

pub use error::HydrationError;
pub use fields::{Fields, Scalar};

use crate::model::Report;
use crate::syntax::RawTree;

/// A document type hydrated from a raw object.
pub trait Document: Sized {
    /// Template name used in error messages.
    const TEMPLATE: &'static str;
    /// Keys accepted by the template.
    const KEYS: &'static [&'static str];

    fn hydrate(fields: &Fields) -> Result<Self, HydrationError>;
}

/// Hydrates a whole report.
pub fn hydrate(raw: &RawTree) -> Result<Report, HydrationError> {
    let instance = Instance::new();
    instance.hydrate(raw)?;
    instance.into_inner().ok_or_else(|| HydrationError::Inconsistent {
        path: String::new(),
        template: Report::TEMPLATE,
        reason: "hydrated instance is empty".to_string(),
    })
}

pub(crate) fn hydrate_at<D: Document>(raw: &RawTree, path: String) -> Result<D, HydrationError> {
    let fields = Fields::seal::<D>(raw, path)?;
    D::hydrate(&fields)
}

/// A write-once slot holding a hydrated document.
#[derive(Debug)]
pub struct Instance<D> {
    cell: OnceCell<D>,
}

impl<D: Document> Instance<D> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Hydrates `raw` into this slot and freezes it.
    ///
    /// A failed hydration leaves the slot empty. A slot that already holds
    /// a document is never overwritten.
    pub fn hydrate(&self, raw: &RawTree) -> Result<&D, HydrationError> {
        let mut fresh = false;
        let document = self.cell.get_or_try_init(|| {
            fresh = true;
            hydrate_at(raw, String::new())
        })?;

        if fresh {
            Ok(document)
        } else {
            Err(HydrationError::AlreadyFrozen {
                path: String::new(),
                template: D::TEMPLATE,
            })
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Option<&D> {
        self.cell.get()
    }

    pub fn into_inner(self) -> Option<D> {
        self.cell.into_inner()
    }
}

impl<D: Document> Default for Instance<D> {
    fn default() -> Self {
        Self::new()
    }
}
