//! Churn-cycle engine: rate-limited creation and deletion of pod/service
//! pairs, verified through DNS.

pub mod config;
pub mod cycle;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod resources;
pub mod scheduler;
pub mod traits;
pub mod verifier;

pub use config::{parse_duration, ChurnConfig};
pub use cycle::{CycleReport, CycleRunner};
pub use error::{ApiError, ApiResult, ConfigError, OracleError, OracleResult};
pub use identity::{CycleIdentity, NameGenerator};
pub use metrics::ChurnMetrics;
pub use resources::{Action, EndpointSpec, ObjectKind, ResourceFactory, ResourcePair, WorkloadSpec};
pub use scheduler::{ConcurrencyPolicy, RateScheduler};
pub use traits::{ClusterApi, NameOracle};
pub use verifier::{ConvergenceVerifier, VerificationOutcome, VerifyMode};
