//! Terminal UI module for stayfront.
//!
//! Provides the 24-bit color theme shared by the toast renderer and the CLI.

mod colors;

pub use colors::Theme;
