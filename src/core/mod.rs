pub mod backup;
pub mod derive;
pub mod log;
pub mod mirror;
pub mod tracker;

pub use mirror::MirrorStore;
pub use tracker::{Clock, RunState, StartOptions, SystemClock, Tracker};
