pub mod fence;
pub mod footnotes;
pub mod format;
pub mod narrative;
pub mod quote;
pub mod social;
pub mod strip;
pub mod tagline;
pub mod timeline;
