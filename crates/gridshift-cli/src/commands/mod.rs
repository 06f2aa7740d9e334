pub mod graph;
pub mod mutate;
