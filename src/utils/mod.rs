mod io_utils;
mod readers;
mod util;

pub use io_utils::{create_writer, sanitize_file_component};
pub use readers::{open_text_reader, uncompressed_name};
pub use util::{handle_error_and_exit, Result};
