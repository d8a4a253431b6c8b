//! Bookshelf application library
//!
//! The book catalog module and its registration with the bookshelf kernel.

pub mod modules;

pub use modules::*;
