//! Outbound adapters: language-model HTTP clients.

pub mod model;
