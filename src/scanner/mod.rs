pub mod path_filter;
pub mod source_scanner;

pub use path_filter::PathFilter;
pub use source_scanner::{ScanStatistics, SourceFile, SourceScanner};
