//! Small helpers shared across gateways

pub mod truncate;
