//! Inquiries Module
//!
//! Customer support questions with file attachments and admin answers.
//!
//! ```text
//! inquiries/
//! ├── mod.rs       - Exports
//! ├── repo.rs      - inquiries / inquiry_files tables
//! └── handlers.rs  - /api/inquiries endpoints
//! ```

pub mod repo;

pub mod handlers;

pub use handlers::{answer_inquiry, create_inquiry, get_inquiry, list_inquiries, InquiryResponse};
