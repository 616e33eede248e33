//! Main module for synoptic library functionality

pub mod assembling;
pub mod classification;
pub mod colophon;
pub mod entry;
pub mod formats;
pub mod notes;
pub mod parsing;
pub mod project;
pub mod search;
pub mod session;
pub mod surface;
pub mod testing;
pub mod witness;
