pub mod stock;
pub mod snapshot;
pub mod response;

pub use stock::*;
pub use snapshot::*;
pub use response::*;
