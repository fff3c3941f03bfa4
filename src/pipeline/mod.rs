//! The moderation pipeline.
//!
//! Every inbound event flows through one canonical path:
//! 1. `AccessGate` — license gating, admin/owner immunity
//! 2. `classifier` — link and banned-word detection over normalized text
//! 3. `WarningLedger` — counter escalation, suspension at the threshold
//! 4. `ApprovalWorkflow` — human adjudication for quarantined media
//!
//! There is exactly one punishment path and one handler per message; the
//! pipeline owns routing and failure isolation.

pub mod approval;
pub mod classifier;
pub mod commands;
pub mod gate;
pub mod ledger;
pub mod normalize;
pub mod processor;
pub mod types;

pub use processor::ModerationPipeline;
