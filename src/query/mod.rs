pub mod filter_query;

pub use filter_query::{parse_filter_query, FilterQuery};
