pub mod errors;
pub mod events;
pub mod flow;
pub mod types;

pub use errors::{BridgeError, ConfigError, StreamError};
pub use events::{EventBus, HostEvent, HostEventReceiver};
pub use flow::{FlowDocument, SharedFlow, FLOW_KEY};
pub use types::{ContentSize, DetachWait, SessionLifecycleState, Size};

pub type Result<T> = std::result::Result<T, StreamError>;
