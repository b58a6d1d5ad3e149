pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod lifecycle;
pub mod model;

pub use error::{Error, NetworkError, Result, StateError, ValidationError};
pub use graph::{GraphEdge, GraphNode, Layout, LayoutConfig, layout, to_graph, validate_layout_config};
pub use lifecycle::{LifecycleRecord, Session, Status, TrackingStore};
pub use model::{Blueprint, Task, TaskArgs, is_root, validate};
