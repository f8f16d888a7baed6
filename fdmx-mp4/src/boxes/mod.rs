mod emsg;
mod sidx;

pub use emsg::{EmsgBox, EmsgTime};
pub use sidx::{SidxBox, SidxRange, SidxTiming};
