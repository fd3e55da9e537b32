//! Integration tests against a running server.
//!
//! Start the server with a librarian account configured
//! (`LOCALLIBRARY_AUTH__ADMIN_USERNAME=admin`, `LOCALLIBRARY_AUTH__ADMIN_PASSWORD=admin`)
//! and run with: cargo test -- --ignored

mod api_tests;
mod catalog_tests;
