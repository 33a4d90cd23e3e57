pub mod mkvmerge;

pub use mkvmerge::inspect;
