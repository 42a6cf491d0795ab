pub mod agent;
pub mod tooling;
