//! Multi-timeframe loading: request type and the load protocol.
mod load;
/// Request parameters.
pub mod request;
