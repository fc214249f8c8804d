//! Data model shared by the inference, scoring and session layers.
//!
//! Two coordinate spaces coexist:
//! - **rendered**: on-screen pixels of the displayed image ([`DrawnBox`])
//! - **original**: native pixels of the source image ([`PredictedBox`])
//!
//! [`ImageFrame::transform_for`] resolves the mapping between them once the native
//! size is known (it comes back with each [`InferenceResult`]).

pub mod candidate;
pub mod geometry;
pub mod result;

pub use candidate::{ClassCount, ModelCandidate};
pub use geometry::{DrawnBox, FrameTransform, ImageFrame, Point, PredictedBox, Rect};
pub use result::InferenceResult;
