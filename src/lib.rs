//! Synheart Vigil - On-device anomaly trigger engine for activity episodes
//!
//! Vigil watches a stream of finished activity episodes (idle/active
//! interval pairs), learns an hour-of-day by weekday/weekend baseline
//! online, and decides in real time whether current activity is anomalously
//! high: episode -> activity update -> baseline record -> seasonal
//! denoising -> return-period threshold -> hysteresis trigger.
//!
//! Capture (how episodes are produced) and notification delivery (what a
//! raised event does) are external collaborators; Vigil only consumes
//! episode summaries and yields decisions.
//!
//! ## Modules
//!
//! - **stats**: Welford running moments and the inverse normal CDF
//! - **baseline**: hourly weekday/weekend activity buckets
//! - **activity**: exponentially-decayed duty-cycle activity level
//! - **smoother**: Fourier low-pass / legacy interpolated denoising
//! - **threshold**: return-period threshold derivation
//! - **trigger**: hysteresis state machine
//! - **pipeline**: the per-episode processing entry point

pub mod activity;
pub mod baseline;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod smoother;
pub mod stats;
pub mod threshold;
pub mod trigger;
pub mod types;

pub use config::EngineConfig;
pub use error::EngineError;
pub use pipeline::VigilProcessor;
pub use smoother::SmoothingStrategy;
pub use types::{Episode, EpisodeOutcome, Notification, TriggerState};

/// Vigil version embedded in exported snapshots
pub const VIGIL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for exported snapshots
pub const PRODUCER_NAME: &str = "synheart-vigil";
