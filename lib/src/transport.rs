//! Blocking TCP/UDP transport with timeout-governed send/recv. Every
//! high-level command opens, exchanges one request/response, and closes;
//! `Drop` guarantees the underlying socket is released on every exit path,
//! the Rust analogue of the original's `__enter__`/`__exit__`.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::error::McError;

const RECV_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
}

impl Transport {
    pub fn parse(s: &str) -> Result<Self, McError> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Transport::Tcp),
            "udp" => Ok(Transport::Udp),
            other => Err(McError::ConnectError(format!(
                "invalid transport '{other}'; use 'tcp' or 'udp'"
            ))),
        }
    }
}

enum Socket {
    Tcp(TcpStream),
    Udp { socket: UdpSocket, remote: SocketAddr },
}

/// One transport-layer connection to a PLC, opened for the duration of a
/// single high-level command.
pub struct Connection {
    socket: Socket,
}

impl Connection {
    pub fn connect(
        host: &str,
        port: u16,
        timeout: Duration,
        transport: Transport,
    ) -> Result<Self, McError> {
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| McError::ConnectError(format!("Failed to connect to {host}:{port} - {e}")))?
            .next()
            .ok_or_else(|| {
                McError::ConnectError(format!(
                    "Failed to connect to {host}:{port} - no address resolved"
                ))
            })?;

        let socket = match transport {
            Transport::Tcp => {
                let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
                    McError::ConnectError(format!("Failed to connect to {host}:{port} - {e}"))
                })?;
                stream
                    .set_read_timeout(Some(timeout))
                    .map_err(|e| McError::ConnectError(e.to_string()))?;
                stream
                    .set_write_timeout(Some(timeout))
                    .map_err(|e| McError::ConnectError(e.to_string()))?;
                Socket::Tcp(stream)
            }
            Transport::Udp => {
                let socket = UdpSocket::bind("0.0.0.0:0")
                    .map_err(|e| McError::ConnectError(format!("Failed to bind UDP socket - {e}")))?;
                socket
                    .set_read_timeout(Some(timeout))
                    .map_err(|e| McError::ConnectError(e.to_string()))?;
                socket
                    .set_write_timeout(Some(timeout))
                    .map_err(|e| McError::ConnectError(e.to_string()))?;
                socket.connect(addr).map_err(|e| {
                    McError::ConnectError(format!("Failed to connect to {host}:{port} - {e}"))
                })?;
                Socket::Udp { socket, remote: addr }
            }
        };

        log::debug!("connected to {host}:{port} via {transport:?}");
        Ok(Connection { socket })
    }

    pub fn send(&mut self, data: &[u8]) -> Result<(), McError> {
        log::debug!("send: {}", hex_preview(data));
        match &mut self.socket {
            Socket::Tcp(stream) => stream
                .write_all(data)
                .map_err(|e| McError::ConnectError(e.to_string())),
            Socket::Udp { socket, remote } => socket
                .send_to(data, *remote)
                .map(|_| ())
                .map_err(|e| McError::ConnectError(e.to_string())),
        }
    }

    pub fn recv(&mut self) -> Result<Vec<u8>, McError> {
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let n = match &mut self.socket {
            Socket::Tcp(stream) => stream
                .read(&mut buf)
                .map_err(|e| McError::ConnectError(e.to_string()))?,
            Socket::Udp { socket, .. } => socket
                .recv(&mut buf)
                .map_err(|e| McError::ConnectError(e.to_string()))?,
        };
        log::debug!("recv: {}", hex_preview(&buf[..n]));
        Ok(buf[..n].to_vec())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Socket::Tcp(stream) = &self.socket {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

fn hex_preview(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}
