pub mod gate;
pub mod migrate;
pub mod token;
