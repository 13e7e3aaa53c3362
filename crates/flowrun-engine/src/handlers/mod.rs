//! Built-in node handlers, one per type tag.

pub mod condition;
pub mod email;
pub mod form;
pub mod integration;
pub mod lifecycle;

pub use condition::ConditionHandler;
pub use email::EmailHandler;
pub use form::FormHandler;
pub use integration::IntegrationHandler;
pub use lifecycle::{EndHandler, StartHandler};
