//! Data models for docshelf.

mod document;
mod domain;

pub use document::{AnalysisStatus, DocumentRecord};
pub use domain::{Domain, UnknownDomain};

#[cfg(test)]
pub(crate) use document::fixtures;
