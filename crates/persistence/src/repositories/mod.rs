//! Repository implementations for database access.

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

pub use alert::AlertRepository;
pub use caregiver::CaregiverRepository;
pub use contact::ContactRepository;
pub use delivery::DeliveryRepository;
pub use institution::InstitutionRepository;
pub use location_ping::LocationPingRepository;
pub use person::PersonRepository;
pub use push_token::PushTokenRepository;
pub use report::ReportRepository;
pub use response::ResponseRepository;
pub use vigilance::VigilanceRepository;
