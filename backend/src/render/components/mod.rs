pub mod charts;
pub mod header;
pub mod results;
pub mod upload_section;
pub mod utils;
