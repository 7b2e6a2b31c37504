//! Business logic, decoupled from transport.
//!
//! Route handlers stay thin: they decode the wire event and delegate here.
//! Service functions take `&AppState` plus plain values, so every rule about
//! rooms, membership, and fanout can be exercised in tests without a socket.

pub mod room;
