pub mod audit;
pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod gateway;
pub mod intent;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::event::{Event, EventId, NewEvent};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{DispatchEvent, DispatchFlow, DispatchState, DispatchTrace, DispatchTransitionError};
pub use gateway::{
    CallerId, ChatGateway, ChatId, GatewayError, InboundMessage, MessageFormat, OutboundMessage,
};
pub use intent::{Classification, Intent, IntentError, IntentKind};
