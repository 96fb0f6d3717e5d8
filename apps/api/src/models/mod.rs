pub mod applicant;
pub mod application;
pub mod job;
