//! Sampling, smoothing and auto-scale engine behind the tracemon strip chart.
//!
//! The poller thread publishes raw counter samples into a [`LatestValue`];
//! the render loop reads it once per frame and advances a [`ChartModel`],
//! which yields the per-column [`Segment`]s to draw.

pub mod chart;
pub mod clock;
pub mod error;
pub mod mailbox;
pub mod poller;
pub mod ring;
pub mod scale;
pub mod shade;
pub mod smoothing;
pub mod source;
pub mod stats;
pub mod types;

pub use chart::{ChartConfig, ChartModel, FrameReport};
pub use clock::FrameClock;
pub use error::{EngineError, OpenError, PollError};
pub use mailbox::LatestValue;
pub use poller::{CancelToken, PollerShared, spawn_poller};
pub use ring::{ResizeAnchor, SampleRing};
pub use scale::{AutoScale, ScaleStep};
pub use shade::{FrameGeometry, Segment, TraceStyle, remap};
pub use smoothing::Smoother;
pub use source::{MetricSource, ScriptedSource};
pub use stats::PollStats;
pub use types::Resolution;
