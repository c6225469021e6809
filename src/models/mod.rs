pub mod ballot;
pub mod citizen;
pub mod reply;
pub mod vote;
