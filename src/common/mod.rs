mod fs;
mod numeric;

pub(crate) use fs::*;
pub use numeric::*;
