//! Named documents.
//!
//! This module contains:
//! - The repository that saves and loads documents from local storage
//! - Route handlers for listing, creating, opening and deleting documents

mod handlers;
mod repository;

pub use handlers::{
    create_document, delete_document, get_document_info, list_documents, open_document,
};
pub use repository::{
    DEFAULT_DOCUMENT_NAME, DocumentInfo, DocumentMetadata, DocumentRepository, DocumentSummary,
    document_name,
};
