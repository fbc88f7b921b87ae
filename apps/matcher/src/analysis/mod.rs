// Parameter extraction: job postings and CVs → named, weighted parameters.
// The extractors are pure functions over text; `handlers` adds store lookups
// and the HTTP surface.

pub mod cv_extractor;
pub mod dictionaries;
pub mod handlers;
pub mod job_extractor;
pub mod models;
pub mod text;
