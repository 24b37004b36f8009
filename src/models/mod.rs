pub mod endpoint;
pub mod fixture;
pub mod league;
pub mod phase;
pub mod results;

pub use endpoint::EndpointDescriptor;
pub use fixture::{Fixture, FixtureStatus};
pub use league::League;
pub use phase::{Phase, SubState, fold_sub_state};
pub use results::{
    DryRunReport, FailedEndpoint, PhaseEndpointsView, PhaseInspection, RefreshResult, RunSummary,
    SummaryCounts,
};
