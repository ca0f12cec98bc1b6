mod bootstrap;
mod communicator;
mod sync_client;
mod typed_collectives;

pub use communicator::Communicator;
pub use sync_client::SyncCommunicator;
