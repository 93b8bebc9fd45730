#![allow(dead_code)]

pub mod fixtures;
pub mod mock_executor;
pub mod mock_store;
pub mod strategies;

pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_executor::*;
#[allow(unused_imports)]
pub use mock_store::*;
