// Shared error types for Callsight.

pub mod errors;

pub use errors::CallsightError;
