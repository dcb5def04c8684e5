use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use crate::error::{RadioError, Result};
use crate::traits::{RadioTransport, RawFrame, FRAME_SIZE};

/// Receives one frame per UDP datagram.
///
/// Intended for a radio gateway that forwards raw payloads from the air
/// unchanged. Datagrams of any other size are consumed and reported as
/// [`RadioError::FrameSize`], leaving the socket usable.
#[derive(Debug)]
pub struct UdpRadio {
    socket: UdpSocket,
}

impl UdpRadio {
    /// Bind a gateway socket.
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let label = addr.to_string();
        let socket = UdpSocket::bind(addr).map_err(|source| RadioError::Bind {
            addr: label,
            source,
        })?;
        Self::from_socket(socket)
    }

    /// Wrap an already bound socket.
    pub fn from_socket(socket: UdpSocket) -> Result<Self> {
        socket.set_nonblocking(true)?;
        if let Ok(addr) = socket.local_addr() {
            tracing::debug!(%addr, "udp radio listening");
        }
        Ok(Self { socket })
    }

    /// Local address the gateway should send to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    fn recv_blocking(&mut self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        self.socket.set_nonblocking(false)?;
        let received = loop {
            match self.socket.recv_from(buf) {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                other => break other,
            }
        };
        self.socket.set_nonblocking(true)?;
        Ok(received?)
    }
}

impl RadioTransport for UdpRadio {
    fn frame_available(&mut self) -> Result<bool> {
        // One spare byte so an oversized datagram is still visible as oversized.
        let mut peeked = [0u8; FRAME_SIZE + 1];
        match self.socket.peek_from(&mut peeked) {
            Ok(_) => Ok(true),
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                Ok(false)
            }
            Err(err) => Err(RadioError::Io(err)),
        }
    }

    fn receive(&mut self) -> Result<RawFrame> {
        let mut buf = [0u8; FRAME_SIZE + 1];
        let (len, from) = match self.socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                self.recv_blocking(&mut buf)?
            }
            Err(err) => return Err(RadioError::Io(err)),
        };

        if len != FRAME_SIZE {
            tracing::debug!(%from, len, "dropping datagram of unexpected size");
            return Err(RadioError::FrameSize {
                actual: len,
                expected: FRAME_SIZE,
            });
        }
        RawFrame::try_from(&buf[..len])
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn wait_available(radio: &mut UdpRadio) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if radio.frame_available().unwrap() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn receives_one_frame_per_datagram() {
        let mut radio = UdpRadio::bind("127.0.0.1:0").unwrap();
        let target = radio.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();

        assert!(!radio.frame_available().unwrap());

        sender.send_to(&[7u8; FRAME_SIZE], target).unwrap();
        assert!(wait_available(&mut radio));
        let frame = radio.receive().unwrap();
        assert_eq!(frame.as_bytes(), &[7u8; FRAME_SIZE]);
    }

    #[test]
    fn wrong_size_datagram_is_recoverable() {
        let mut radio = UdpRadio::bind("127.0.0.1:0").unwrap();
        let target = radio.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();

        sender.send_to(&[1u8; 12], target).unwrap();
        sender.send_to(&[2u8; FRAME_SIZE], target).unwrap();

        assert!(wait_available(&mut radio));
        let err = radio.receive().unwrap_err();
        assert!(matches!(err, RadioError::FrameSize { actual: 12, .. }));
        assert!(err.is_recoverable());

        assert!(wait_available(&mut radio));
        assert_eq!(radio.receive().unwrap().as_bytes(), &[2u8; FRAME_SIZE]);
    }

    #[test]
    fn receive_blocks_for_next_datagram() {
        let mut radio = UdpRadio::bind("127.0.0.1:0").unwrap();
        let target = radio.local_addr().unwrap();

        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
            socket.send_to(&[3u8; FRAME_SIZE], target).unwrap();
        });

        let frame = radio.receive().unwrap();
        assert_eq!(frame.as_bytes(), &[3u8; FRAME_SIZE]);
        sender.join().unwrap();
    }
}
