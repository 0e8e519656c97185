pub mod heuristics;
pub mod rate;
