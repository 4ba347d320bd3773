pub mod transformation;
pub mod user;

pub use transformation::{JobKind, TaskOutcome, Transformation, TransformationStatus};
pub use user::{SubscriptionType, UserAccount};
