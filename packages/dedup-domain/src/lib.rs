pub mod attribute;
pub mod catalog;
pub mod combination;
pub mod normalize;
pub mod ports;
pub mod query;
pub mod request;
pub mod rule;
pub mod search;
pub mod synthesizer;

mod error;

pub use attribute::{AttributeKey, AttributeObservation, FieldKind, Observation, TreatmentType};
pub use catalog::{AttributeCatalog, CatalogEntry, StaticCatalog};
pub use combination::combinations;
pub use error::{Error, Result};
pub use ports::{
	BackendError, BackendErrorKind, BoxFuture, IdentityState, SearchBackend, StateError,
};
pub use query::{Clause, Marker, MatchMode, QueryDescriptor};
pub use request::{QueryRequest, RequestContext, RequestGenerator};
pub use rule::{DuplicateRule, TreatmentGroup, can_apply};
pub use search::{ResultSet, ScoredHit, SearchResponse};
pub use synthesizer::{QuerySynthesizer, SynthesisOptions, WorkingAttribute};
