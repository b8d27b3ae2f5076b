//! Geographic query integration tests.
//!
//! Every query is checked against a linear scan over the records the index
//! was built from.

mod box_search_test;
mod radius_search_test;
