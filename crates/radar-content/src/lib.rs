pub mod arxiv;
pub mod error;
pub mod links;
pub mod page;
pub mod resolver;

pub use arxiv::{AbstractEntry, ArxivClient};
pub use error::ContentError;
pub use links::LinkExtractor;
pub use page::{PageFetcher, extract_main_text};
pub use resolver::{ContentResolver, ContentSource, ResolverSettings, SourceKind, classify};
