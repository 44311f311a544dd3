// SLM Command Center - Core Library
// Exposes all modules for use in the CLI/TUI, the API server, and tests

pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod markup;
pub mod matcher;
pub mod modules;     // Scenario modules, one per demo page
pub mod navigation;
pub mod notice;
pub mod pages;
pub mod session;
pub mod state;
pub mod surface;
pub mod typing;      // Typewriter, counters, timelines, playback

// Re-export commonly used types
pub use config::{AnimationConfig, Config, ConfigError, CostDefaults};
pub use error::{CommandCenterError, Result};
pub use export::{ExportDocument, Exportable};
pub use markup::Fragment;
pub use matcher::{KeywordMatcher, Trigger};
pub use modules::Run;
pub use navigation::Module;
pub use notice::{Notice, NoticeLevel};
pub use session::Session;
pub use state::{Catalog, RunGuard, RunTicket, Selection};
pub use surface::{MemorySurface, Surface, Update};
pub use typing::{
    play, CancelToken, Clock, Counter, Easing, InstantClock, Keyframe, Playback, SystemClock,
    Timeline, Typewriter,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
