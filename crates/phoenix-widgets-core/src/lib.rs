//! # Phoenix Widgets Core Library
//!
//! This library decides which dashboard widgets are worth showing, where new
//! widgets go, and when stale ones are retired. It has no rendering code of
//! its own: a front end feeds it engagement events and screen geometry and
//! acts on the answers.
//!
//! ## Architecture
//!
//! - **Engagement tracking**: per-widget counters, created lazily on the
//!   first event
//! - **Relevance**: recency, engagement and age blended into a 0.0-1.0 score,
//!   plus an advisory time-of-day multiplier
//! - **Placement**: boundary clamping, collision detection and a grid search
//!   for free positions
//! - **Lifecycle**: score bands mapped to remove / fade / maintain / promote /
//!   demote, and a sweep that takes stale widgets down
//! - **Drivers**: tick, decay and cleanup periods, polled cooperatively or run
//!   on tokio
//!
//! ## Key Components
//!
//! - [`WidgetAwareness`]: the engine, owning all engagement state
//! - [`WidgetHost`]: trait for the widget manager the engine talks to
//! - [`Positionable`]: trait for anything with a movable on-screen rect
//! - [`Clock`]: injectable time source
//! - [`Config`]: TOML-backed configuration

pub mod clock;
pub mod config;
pub mod drivers;
pub mod engagement;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod lifecycle;
pub mod placement;
pub mod relevance;
pub mod runtime;
pub mod service;
pub mod simulation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{config_dir, Config};
pub use drivers::{DriverIntervals, DriverKind, DriverSchedule};
pub use engagement::{EngagementEvent, EngagementRecord, EngagementSummary, EngagementTracker};
pub use error::{ConfigError, CoreError, PlacementError, ValidationError};
pub use events::Event;
pub use geometry::{Point, Positionable, Rect, Size, Viewport};
pub use host::{HostedWidget, InMemoryWidgetHost, WidgetHost};
pub use lifecycle::{LifecycleAction, LifecyclePolicy, LifecycleThresholds};
pub use placement::{BoundaryResult, Collision, Constraints, PlacementSolver};
pub use relevance::{
    contextual_multiplier, RelevanceBreakdown, RelevanceModel, RelevanceWeights, TimeOfDay,
    KNOWN_WIDGET_TYPES,
};
pub use runtime::{spawn_drivers, DriverHandle};
pub use service::{EngineSettings, WidgetAwareness};
pub use simulation::{SimulationConfig, SimulationReport, Simulator, WidgetOutcome};
