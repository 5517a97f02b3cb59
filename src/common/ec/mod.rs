mod encoder;
mod galois;
mod generator;
mod poly;

pub use encoder::*;
pub use galois::*;
pub use generator::*;
