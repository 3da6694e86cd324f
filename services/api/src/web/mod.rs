pub mod protocol;
pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible to the binary that
// builds the web server router.
pub use rest::{
    chat_handler, delete_document_handler, insights_handler, list_documents_handler,
    setup_handler, upload_document_handler,
};
