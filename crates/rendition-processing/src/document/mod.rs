//! Document processors: PDF thumbnails and text, office-to-PDF conversion.

mod office;
mod pdf;

pub use office::OfficeConverter;
pub use pdf::PdfProcessor;
