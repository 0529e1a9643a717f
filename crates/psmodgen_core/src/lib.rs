pub mod config;
pub mod format;
pub mod fragments;
pub mod manifest;
pub mod model;
pub mod resolve;
pub mod script;
