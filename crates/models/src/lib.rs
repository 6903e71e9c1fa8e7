// [crates/models/src/lib.rs]
/*!
 * Shared data model (spec.md §3), generalized from the teacher's
 * `prospector-domain-models` crate: the same "plain data, no behavior"
 * convention survives, the bitcoin-mining-specific types (`Finding`,
 * `WorkOrder`, `StratumManifest`, ...) do not.
 */

pub mod agent;
pub mod job;
pub mod ledger;
pub mod log;
pub mod node;
pub mod payment;

pub use agent::{AgentDefinition, ToolDescriptor};
pub use job::{JobRecord, JobStatus};
pub use ledger::{DepositRecord, UserBalance};
pub use log::{ConnectionEvent, ConnectionEventKind, LogEntry, LogLevel};
pub use node::{NodeMetrics, NodeRecord, NodeStatus};
pub use payment::{AgentPayment, PaymentDistribution};
