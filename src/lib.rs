pub mod animator;
pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod dust;
pub mod frame;
pub mod geometry;
pub mod host;
pub mod lighting;
pub mod math;
pub mod orbs;
pub mod renderer;
pub mod terrain;
pub mod types;

pub use animator::SceneAnimator;
pub use config::{SceneConfig, Variant};
