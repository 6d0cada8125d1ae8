mod parameters;

pub use parameters::*;
