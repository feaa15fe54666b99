// Main library entry point for calltrace.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
