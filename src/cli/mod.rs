//! Command line front end: argument shapes and terminal rendering

pub mod convert;
pub mod currency;
pub mod quick;
pub mod setup;
pub mod ui;
