// Race scheduling, sampling and ranking
pub mod benchmarking;

// Bundled query strategies and their registry
pub mod strategies;
