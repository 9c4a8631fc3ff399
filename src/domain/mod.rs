// Domain layer: the descriptor and schema the host sees, the wire shapes of
// the remote API, and the ports between them.

pub mod model;
pub mod ports;
pub mod remote;
