//! Elitism and pruning policy
pub mod policy;

pub use self::policy::CullingPolicy;
