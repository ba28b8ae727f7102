//! File parsers for source code and message files.
//!
//! - `json`: locale message files (one JSON object per locale)
//! - `jsx`: JSX/TSX source files (uses swc for AST generation)

pub mod json;
pub mod jsx;
