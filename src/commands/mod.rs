pub mod search;
pub mod seeds;
