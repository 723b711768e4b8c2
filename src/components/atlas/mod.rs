//! Atlas map graph: construction, filtering and display.
//!
//! Turns a flat list of map entities into a deduplicated node/edge snapshot,
//! dims maps that do not match the search query, colors each map by tier or
//! market score, and fits the viewport to the matched maps.
//!
//! - [`search`]: query matching against each map's search text
//! - [`graph`]: visible-set selection, labels, colors and edge dedup
//! - [`fit`]: fit target, bounds and the debounced fit scheduler
//! - [`prefs`]: persisted display mode
//!
//! # Example
//!
//! ```ignore
//! use atlas_view::{AtlasCanvas, MapEntity};
//!
//! let maps: Vec<MapEntity> = atlas_view::parse_maps(json)?;
//! let (search, set_search) = signal(String::new());
//!
//! view! { <AtlasCanvas maps=maps search=search /> }
//! ```

mod component;
pub mod fit;
pub mod graph;
pub mod prefs;
mod render;
pub mod scale;
pub mod search;
pub mod state;
pub mod theme;
mod types;

pub use component::AtlasCanvas;
pub use scale::AtlasConfig;
pub use types::{AtlasEdge, AtlasGraph, AtlasNode, MapEntity, NodeKind, Point, parse_maps};
