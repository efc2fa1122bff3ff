//! Application services: the engines behind the routes.

pub mod abuse;
pub mod alert_engine;
pub mod classifier;
pub mod dispatch;
pub mod fcm;
pub mod resolver;
pub mod vigilance;

pub use abuse::AbuseEngine;
pub use alert_engine::AlertEngine;
pub use classifier::Classifier;
pub use dispatch::Dispatcher;
pub use fcm::FcmPush;
pub use resolver::RecipientResolver;
pub use vigilance::VigilanceEngine;
