//! Content discovery, frontmatter extraction and metadata resolution.

mod frontmatter;
mod markdown;
mod meta;
mod scan;

pub use frontmatter::{Extracted, Frontmatter, FrontmatterValue, parse_frontmatter};
pub use markdown::{Heading, extract_headings, slugify, strip_markdown};
pub use meta::{DocumentMetadata, ProcessedDocument, resolve_metadata};
pub use scan::scan;
