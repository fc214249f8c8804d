//! Search sessions: candidate retrieval, streaming inference and result collection.

pub mod collector;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod provider;
pub mod search;


pub use collector::{ModelStatus, ResultCollector};
pub use error::{ProviderError, SessionError};
#[cfg(any(test, feature = "mock"))]
pub use mock::StaticCandidateProvider;
pub use provider::{CandidateProvider, SearchCriteria};
pub use search::SearchSession;
