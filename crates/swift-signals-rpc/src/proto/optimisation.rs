//! `swiftsignals.optimisation`: the long-running optimiser.
//!
//! `RunOptimisation` takes and returns `swiftsignals.common.OptimisationParameters`.

/// Fully-qualified method paths of `swiftsignals.optimisation.OptimisationService`.
pub mod methods {
    pub const RUN_OPTIMISATION: &str =
        "/swiftsignals.optimisation.OptimisationService/RunOptimisation";
}
