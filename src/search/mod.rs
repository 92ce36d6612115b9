//! Paper lookup: picking a PDF from search results and running the
//! search → download → extract → summarize chain.

pub(crate) mod engine;
pub(crate) mod select;
