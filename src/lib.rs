//! Interactive terminal globe with country pins, hover highlighting and
//! pop-up labels.

pub mod animation;
pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod interaction;
pub mod map;
pub mod selection;
pub mod ui;

mod hash;

pub use app::{App, FrameRenderer};
pub use config::GlobeConfig;
pub use error::GlobeError;
