pub mod cli;
pub mod commands;
pub mod graph;
pub mod hmm;
pub mod search;
pub mod utils;
pub mod writers;
