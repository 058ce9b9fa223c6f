pub mod criteria;
pub mod executor;

pub use criteria::{Filter, SearchCriteria};
pub use executor::{CandidateSet, QueryExecutor};
