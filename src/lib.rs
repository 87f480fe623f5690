pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod gather;
pub mod github;
pub mod logging;
pub mod scheduler;
pub mod source;
pub mod stats;

pub use config::Config;
pub use display::{HtmlPage, MemoryDisplay, StatKey, StatsDisplay, SvgCard};
pub use error::{ConfigError, DisplayError, GithubError};
pub use github::GithubClient;
pub use scheduler::Scheduler;
pub use source::StatsSource;
pub use stats::{Aggregator, StatsResult};
