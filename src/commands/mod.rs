//! Command implementations for koi-filter.

pub mod columns;
pub mod filter;

pub use columns::ColumnsCommand;
pub use filter::FilterCommand;
