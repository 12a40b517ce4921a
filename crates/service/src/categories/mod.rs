//! Categories: the autocomplete resolver and the user-edited list behind it.

pub mod catalog;
pub mod resolver;

pub use catalog::CategoryCatalog;
pub use resolver::CategoryResolver;
