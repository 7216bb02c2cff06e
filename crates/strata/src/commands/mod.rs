pub mod deploy;
pub mod graph;
pub mod validate;
