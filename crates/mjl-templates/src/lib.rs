mod errors;
mod scanner;
mod sections;
mod tokens;

pub use errors::SectionError;
pub use errors::TagError;
pub use scanner::ScanResult;
pub use scanner::TagScanner;
pub use sections::validate_sections;
pub use sections::MAX_SECTION_DEPTH;
pub use tokens::ClassifiedSpan;
pub use tokens::SpanKind;
pub use tokens::TagKind;
pub use tokens::TagToken;
