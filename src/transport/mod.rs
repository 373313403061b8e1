//! Front-end transports

pub mod cli;
