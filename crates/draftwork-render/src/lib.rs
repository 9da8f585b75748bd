//! Platform HTML export and outline extraction.
//!
//! Pure transformations over document content. The server wires these in as
//! collaborators; nothing here touches storage or the network.

mod outline;
mod render;

pub use outline::{extract_outline, Lang, OutlineNode};
pub use render::{list_platforms, render_platform_html, Platform, PlatformInfo};
