pub mod app;
pub mod audio;
pub mod audio_io;
pub mod gesture;
pub mod guard;
pub mod region;
pub mod source;
pub mod supervisor;
pub mod wave;

pub use app::{LaunchConfig, TrimApp, TrimEvent};

#[cfg(feature = "kittest")]
pub mod kittest;
