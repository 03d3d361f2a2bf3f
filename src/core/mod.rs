pub mod display_context;
pub mod gpu_context;
pub mod signals;
pub mod timer;

pub use display_context::DisplayContext;
pub use gpu_context::{GpuContext, GpuProbe};
pub use signals::{Signals, WinitSignals};
pub use timer::{FpsCounter, Throttled};
