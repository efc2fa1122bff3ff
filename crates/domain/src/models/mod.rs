//! Domain models and request/response payloads.

pub mod alert;
pub mod delivery;
pub mod location_ping;
pub mod person;
pub mod recipient;
pub mod report;
pub mod response;
pub mod vigilance;

pub use alert::{
    Alert, AlertChannel, InstitutionalMatch, SubmitAlertRequest, SubmitAlertResponse, Tier,
};
pub use delivery::{DeliveryRecord, DeliverySummary, DeliveryStatus};
pub use location_ping::LocationPing;
pub use person::Person;
pub use recipient::{Circle, Recipient, ResolvedRecipients};
pub use report::Report;
pub use response::{AlertResponse, RespondRequest, RespondResponse, ResponderAction};
pub use vigilance::{Vigilance, VigilanceState};
