pub mod connection;
pub mod properties;
pub mod store;

pub use connection::{init_db, Database};
pub use properties::import_properties_file;
pub use store::PropertyStore;
