// src/pipeline/stages/mod.rs

pub mod files;
pub mod reload;
pub mod styles;
pub mod svg;
pub mod twig;

pub use files::{Concat, Dest, Rename};
pub use reload::Reload;
pub use styles::{Compile, Minify, PostProcess};
pub use svg::{SvgMin, SvgStore};
pub use twig::Twig;
