//! Filter-and-aggregate engine behind the purchases dashboard.
//!
//! The desktop binary wires these modules to egui; everything here is plain
//! data processing and can be used (and tested) without a window.

pub mod config;
pub mod data;
pub mod pages;
