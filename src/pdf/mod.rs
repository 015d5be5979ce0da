pub mod writer;

pub use writer::SanitizedPdfWriter;
