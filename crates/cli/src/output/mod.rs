//! Result envelope and rendering for the lookup command.


mod format;
mod model;
mod report;
mod result_builder;
pub mod text;

pub use format::OutputFormat;
pub use model::*;
pub use report::search_index_result;
pub use result_builder::{ResultBuilder, encode_result, print_failure, print_result};
