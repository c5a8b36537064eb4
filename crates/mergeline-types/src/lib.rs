pub mod config;
pub mod token;
pub mod topology;

pub use token::{BufferSide, RoutingTag, Token};
pub use topology::{Role, Topology, TopologyError};
