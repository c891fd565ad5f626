pub mod delivery;
pub mod property;
pub mod reference;

pub use property::{PropertyRecord, RawRecord, ReferenceField};
pub use reference::RawReference;
