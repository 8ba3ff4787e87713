pub mod core;
pub mod catalog;
pub mod sampler;
pub mod spawner;
pub mod generator;
pub mod visuals;
pub mod plugin;

pub use plugin::{PropVisualsPlugin, PropsPlugin};
