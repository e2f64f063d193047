//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod document_store;
mod identity_provider;
mod project_catalogue;

#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    CollectionPath, DOCUMENT_ID_LEN, DocumentStore, DocumentStoreError, FieldFilter,
    StoredDocument, generate_document_id, with_mirrored_id,
};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use project_catalogue::MockProjectCatalogue;
pub use project_catalogue::{
    MODELS_PER_PROJECT, ProjectCatalogue, ProjectCatalogueError, VERSIONS_PER_MODEL,
};
