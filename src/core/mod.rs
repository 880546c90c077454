pub mod actions;
pub mod color;
pub mod connection;
pub mod error;
pub mod filters;
pub mod monitor;
pub mod process;
pub mod socket;
pub mod sort;
pub mod utils;
