use strata_commons::LiveQueryId;
use uuid::Uuid;

/// Source of globally unique live query ids.
pub trait LiveIdGenerator: Send + Sync {
    fn generate(&self) -> LiveQueryId;
}

/// Random (v4) UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl LiveIdGenerator for UuidGenerator {
    fn generate(&self) -> LiveQueryId {
        LiveQueryId::new(Uuid::new_v4().to_string())
    }
}
