pub mod comment;
pub mod pagination;

pub use comment::*;
pub use pagination::*;
