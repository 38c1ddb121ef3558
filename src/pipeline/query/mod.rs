// View computation: re-run on every filter or sort change

pub mod filter;
pub mod sort;

pub use filter::{filter, CategorySelector, FilterSpec};
pub use sort::{sort, Direction, SortKey, SortMode, SortSpec};
