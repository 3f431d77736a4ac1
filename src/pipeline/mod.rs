// Pipeline module - sensor-to-score state machines
//
// - audio: AudioScoringPipeline, ticked every 250 ms by the laugh round
// - motion: MotionScoringPipeline, framed at ~60 Hz by the shake round
//
// Both are plain synchronous structs owned by a round task. Timing,
// cancellation and persistence live in `engine`.

pub mod audio;
pub mod motion;

pub use audio::{AudioScoringPipeline, TickReport, TickWindow};
pub use motion::{FrameReport, MotionScoringPipeline};
