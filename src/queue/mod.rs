pub mod job;
pub mod state;
pub mod worker;

pub use worker::Worker;
