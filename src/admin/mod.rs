/// Admin and moderation
///
/// Admin login gate, agent verification queue, decision log and the
/// verification/ban workflow built on top of them.

pub mod audit;
pub mod moderation;
pub mod queue;
pub mod session;

pub use audit::{ActionLog, ActionType, AdminAction};
pub use moderation::{
    AgentHistoryEntry, AgentHistoryReport, AgentStats, ModerationManager, ResubmissionReceipt,
    VerificationStatus, MAX_VERIFICATION_ATTEMPTS, RESUBMISSION_COOLDOWN_HOURS,
};
pub use queue::{PendingAgent, PendingQueue, QueueEntry, QueueStatus, VerificationQueue};
pub use session::{AdminGate, AdminSession, ADMIN_SESSION_COOKIE, ADMIN_SESSION_HOURS};
