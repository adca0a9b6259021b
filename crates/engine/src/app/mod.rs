mod dispatch;
mod input;
mod loader;
mod loop_runner;
mod metrics;
mod rendering;
mod simulation;
mod slots;
mod speed;
mod tools;

pub use dispatch::{DispatchOutcome, Dispatcher, IgnoreReason};
pub use input::{ControlAction, FrameInput};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use simulation::{FrameOutcome, PreviewContext, Previewer};
pub use slots::{EntitySlot, EntitySlots, Role, SlotId, Tint};
pub use speed::SpeedFactor;
