//! Client library for the Mitsubishi MELSEC MC Protocol 3E frame over TCP
//! or UDP: parse compact device-spec strings, read word/bit devices, and
//! batch heterogeneous reads in a minimum number of round-trips.

pub mod batch;
pub mod commands;
pub mod connection;
pub mod device_code;
pub mod device_spec;
pub mod error;
pub mod frame;
pub mod transport;
pub mod value_codec;

pub use batch::{batch_read, read_device, ReadOutcome};
pub use connection::ConnectionConfig;
pub use device_code::PlcSeries;
pub use device_spec::{DeviceKind, DeviceSpec};
pub use error::McError;
pub use transport::Transport;
pub use value_codec::CommMode;
