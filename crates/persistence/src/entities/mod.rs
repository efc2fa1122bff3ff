//! Entity definitions (database row mappings).

mod alert;
mod caregiver;
mod contact;
mod delivery;
mod institution;
mod location_ping;
mod person;
mod push_token;
mod report;
mod response;
mod vigilance;

pub use alert::AlertEntity;
pub use caregiver::CaregiverEntity;
pub use contact::ContactEntity;
pub use delivery::DeliveryEntity;
pub use institution::InstitutionEntity;
pub use location_ping::LocationPingEntity;
pub use person::PersonEntity;
pub use push_token::PushTokenEntity;
pub use report::ReportEntity;
pub use response::ResponseEntity;
pub use vigilance::{ConfirmationEntity, VigilanceEntity};
