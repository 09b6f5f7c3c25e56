//! PDF manipulation module

pub mod fonts;
pub mod images;
pub mod metadata;
pub mod overlay;

// Re-export commonly used items
pub use metadata::{count_pages, page_size};
pub use overlay::{compose_overlay, ComposeReport, OverlayDescriptor, OverlayOptions};
