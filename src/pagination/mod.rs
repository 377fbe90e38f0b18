//! Cursor pagination over token-linked API collections.

mod cursor;

pub use cursor::{Cursor, Page};

#[cfg(test)]
mod tests;
