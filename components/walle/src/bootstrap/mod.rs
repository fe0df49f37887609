pub mod launcher;
pub mod runtime;
