//! Reference Validator Common Library
//!
//! 結果画面（ブラウザ側）のロジックをDOMから切り離して共有する

pub mod error;
pub mod export;
pub mod filter;
pub mod input;
pub mod progress;
pub mod push;
pub mod session;
pub mod types;
pub mod view;

pub use error::{Error, Result};
pub use export::CitationBundle;
pub use filter::{ResultFilter, TabCounts};
pub use input::{FileSelection, SubmissionInput, SubmissionKind, SubmissionOptions};
pub use progress::{ProgressPhase, ProgressTracker, TIMED_PHASES};
pub use push::{Packet, PushEvent};
pub use session::{Phase, RendererSession, ReportControl, SubmissionTicket};
pub use types::{
    PdfGenerationProgress, ProgressEvent, ReferenceResult, ReferenceStatus, ResultSet, Summary,
    ValidationResponse,
};
pub use view::{ReferenceView, SummaryTile};
