mod color;

pub use color::{hsv_to_rgb, mix, srgb};
