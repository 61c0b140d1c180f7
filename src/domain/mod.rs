// Domain logic for Callsight.

pub mod calls;
pub mod describe;
pub mod edits;
pub mod filter;
pub mod index;
pub mod location;
pub mod report;
