//! # flowline-core
//!
//! Core library for Flowline, the live pipeline visualization of an
//! AI-agent desktop app. It turns raw session telemetry into a composed,
//! renderable snapshot: a presentation mode, an active stage, a bounded
//! particle population, per-stage metrics, and a rolling activity log.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Clients wrap with their
//!   own scheduling (the renderer drives ticks through [`sched::TickLoop`]).
//! - **Not thread-safe**: Clients provide their own synchronization.
//! - **Graceful degradation**: This is a best-effort visualization, not a
//!   system of record; nothing here throws into the host.
//! - **Single owner**: [`session::PipelineSession`] owns the whole state;
//!   every other module is a pure function or value transformer it invokes.
//!
//! ## Quick Start
//!
//! ```rust
//! use flowline_core::{PipelineSession, TelemetryBridge};
//! use flowline_telemetry::TelemetryFrame;
//!
//! let mut session = PipelineSession::new();
//! let mut bridge = TelemetryBridge::new();
//! bridge.observe(&mut session, &TelemetryFrame::default());
//! session.tick();
//! let snapshot = session.state();
//! # let _ = snapshot;
//! ```

// Public modules
pub mod activity;
pub mod bridge;
pub mod classify;
pub mod error;
pub mod mapper;
pub mod metrics;
pub mod particle;
pub mod prefs;
pub mod sched;
pub mod session;
pub mod stage;

// Re-export commonly used items at crate root
pub use activity::{ActivityEntry, ActivityKind, ActivityLog};
pub use bridge::TelemetryBridge;
pub use classify::{classify_kind, classify_stage, KeywordClassifier};
pub use error::{Result, VizError};
pub use mapper::{mode_for, stage_for, PipelineMode};
pub use metrics::{MetricsTable, StageMetrics, StageStatus, FRAME_MS};
pub use particle::{Particle, ParticleSim, MAX_PARTICLES};
pub use prefs::{FilePrefs, KeyValueStore, MemoryPrefs, VisibilityPref, VISIBILITY_KEY};
pub use sched::{FrameDriver, TickLoop};
pub use session::{PipelineSession, PipelineState};
pub use stage::{color_for, Stage, NEUTRAL_COLOR};
