pub mod bootstrap;
pub mod command;
pub mod dispatcher;
pub mod references;
pub mod router;
pub mod server;
pub mod state;

pub use command::Command;
pub use dispatcher::{DispatchSettings, Dispatcher, Outcome};
pub use references::ReferenceStore;
pub use server::GatewayServer;
pub use state::{AppState, SharedState};
