// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GroupRecord, Roster, ResolvedLocation, VisitorQuery, FilterSelection, FilterOptions, RankedGroup, NotificationPayload, UNSPECIFIED_NEIGHBORHOOD};
pub use requests::{SearchRequest, NotifyRequest, invalid_fields};
pub use responses::{GroupCard, SearchResponse, OptionsResponse, NotifyResponse, HealthResponse, ErrorResponse};
