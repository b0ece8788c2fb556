pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::{FileSessionStore, VoteConfig};

pub use core::{
    ballot::{BallotSubmitter, SubmitReadiness},
    booth::VotingBooth,
    catalog::{CatalogPipeline, CatalogSearchClient},
    search::{DebouncedSearch, SearchUpdate},
    selection::{AddOutcome, RankedSelection, SelectionStore, MAX_PICKS},
    session::SessionGate,
};
pub use domain::model::{BallotPayload, CatalogItem, Category, DispatchReceipt, SessionToken};
pub use utils::batch::{batched_fetch, BatchPolicy};
pub use utils::error::{Result, VoteError};
