mod citizen;
mod vote;

pub use citizen::CitizenService;
pub use vote::VoteService;
