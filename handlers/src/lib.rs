pub mod invoke;
pub mod response;
pub mod sentiment_importer;
pub mod snapshot_fetcher;
pub mod snapshot_reader;
pub mod trending;

#[cfg(test)]
mod fakes;

pub use invoke::*;
pub use response::HandlerResponse;
