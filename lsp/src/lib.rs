//! Language server for TaskJuggler project files.

pub mod analyzer;
mod server;

pub use server::run;
