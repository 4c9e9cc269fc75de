//! TCP transport implementation

use super::{Connector, Transport};
use crate::error::{Error, Result};
use std::io::Read;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// TCP transport for a connected device stream
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    fn new(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl Transport for TcpTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.stream.read(buffer) {
            // read() returning zero on TCP means the peer closed cleanly
            Ok(0) => Err(Error::Disconnected),
            Ok(n) => Ok(n),
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                Ok(0)
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::ConnectionReset
                    || e.kind() == std::io::ErrorKind::ConnectionAborted
                    || e.kind() == std::io::ErrorKind::BrokenPipe =>
            {
                Err(Error::Disconnected)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

/// Dialer for a device TCP service
pub struct TcpConnector {
    host: String,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl TcpConnector {
    pub fn new(host: &str, port: u16, connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            port,
            connect_timeout,
            read_timeout,
        }
    }

    fn resolve(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                Error::InvalidConfig(format!("cannot resolve {}:{}", self.host, self.port))
            })
    }
}

impl Connector for TcpConnector {
    fn connect(&mut self) -> Result<Box<dyn Transport>> {
        let addr = self.resolve()?;
        log::debug!("Connecting to {}...", addr);

        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                Error::ConnectTimeout(self.endpoint())
            } else {
                Error::Io(e)
            }
        })?;
        stream.set_read_timeout(Some(self.read_timeout))?;
        stream.set_nodelay(true)?;

        log::info!("Connected to {}", addr);
        Ok(Box::new(TcpTransport::new(stream)))
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_read_timeout_maps_to_zero() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept but send nothing, holding the socket open
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(200));
            drop(stream);
        });

        let mut connector = TcpConnector::new(
            &addr.ip().to_string(),
            addr.port(),
            Duration::from_secs(1),
            Duration::from_millis(50),
        );
        let mut transport = connector.connect().unwrap();

        let mut buf = [0u8; 64];
        assert!(matches!(transport.read(&mut buf), Ok(0)));

        server.join().unwrap();
    }

    #[test]
    fn test_peer_close_maps_to_disconnected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(&[1, 2, 3]).unwrap();
            // Drop closes the socket
        });

        let mut connector = TcpConnector::new(
            &addr.ip().to_string(),
            addr.port(),
            Duration::from_secs(1),
            Duration::from_millis(500),
        );
        let mut transport = connector.connect().unwrap();
        server.join().unwrap();

        let mut buf = [0u8; 64];
        let n = transport.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[1, 2, 3]);

        assert!(matches!(
            transport.read(&mut buf),
            Err(Error::Disconnected)
        ));
    }

    #[test]
    fn test_connect_refused_is_error() {
        // Port from the ephemeral range with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut connector = TcpConnector::new(
            "127.0.0.1",
            addr.port(),
            Duration::from_millis(500),
            Duration::from_millis(100),
        );
        assert!(connector.connect().is_err());
    }
}
