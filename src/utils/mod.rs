pub mod deps;
pub mod logger;
pub mod paths;

pub use deps::check_tools;
pub use logger::init_logging;
