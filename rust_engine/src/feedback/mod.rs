//! 咔哒反馈
//!
//! 求解器只通过 [`EventSink`] 发出事件，不关心声音和画面如何呈现。

mod palette;
mod sink;

pub use palette::{CrackCue, FeedbackPalette, POP_WORDS};
pub use sink::{CrackEvent, EventSink, NullSink, RecordingSink};
