// Matrix alignment and CV↔job match scoring.
// Builds on the extractors in `analysis`; the handlers persist what they produce.

pub mod calculator;
pub mod handlers;
pub mod matrix;
