//! Declarative-block dialect (Terraform HCL)

pub mod inject;
pub mod parser;
pub mod scanner;

pub use inject::{find_resource_block, inject_marker, BlockSpan};
pub use parser::{last_marker, parse_resources, TAGS_ATTRIBUTE};
