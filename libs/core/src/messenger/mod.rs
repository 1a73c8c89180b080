//! Facebook Messenger Send API: outbound message shapes, the sender
//! contract and the Graph client.

pub mod message;
pub mod profile;
pub mod sender;

pub use message::{MessagingType, OutboundMessage, OutboundText, Recipient, SenderAction};
pub use sender::{
    DEFAULT_GRAPH_BASE, DEFAULT_GRAPH_VERSION, DeliveryStatus, GraphSender, OutboundSender,
    SendError, SharedSender,
};
