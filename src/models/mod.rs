pub mod cwl;
pub mod git_details;
pub mod workflow;
