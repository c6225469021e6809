pub mod ballot;
pub mod citizen;
pub mod vote;
