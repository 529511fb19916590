pub mod decoder;
pub mod generator;
pub mod simulator;
