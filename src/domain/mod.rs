// Race value types: workloads, measurements, execution contexts
pub mod race;

// Progress events and reporters
pub mod events;

// Port interfaces
pub mod ports;

// In-process query sandbox used by the bundled strategies
pub mod sandbox;

// Domain-specific error types
pub mod errors;
