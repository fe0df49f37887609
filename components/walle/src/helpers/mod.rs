pub mod colored_writer;
pub mod shutdown;
