//! Command implementations.

pub mod config;
pub mod ingest;
pub mod job;
pub mod rank;
pub mod reprocess;
pub mod rescore;
pub mod submissions;

pub use self::config::execute_config;
pub use self::ingest::execute_ingest;
pub use self::job::execute_job;
pub use self::rank::{execute_rank, execute_shortlist};
pub use self::reprocess::execute_reprocess;
pub use self::rescore::execute_rescore;
pub use self::submissions::execute_submissions;
