//! Event Socket Connection
//!
//! One [`Connection`] is opened per probe and dropped at its end; nothing is pooled or
//! reused. The connection carries a single absolute deadline, fixed when it is opened,
//! that bounds every read and write made through it. When it passes, whichever operation
//! is in flight fails with its own protocol error.

use crate::error::{ExporterError, Result};
use crate::freeswitch::protocol::{
    self, Headers, AUTH_ACCEPTED, AUTH_REQUEST, COMMAND_REPLY, CONTENT_TYPE, REPLY_TEXT,
};
use crate::target::{Address, Target};
use secrecy::{ExposeSecret, SecretString};
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::{timeout_at, Instant};
use tracing::debug;

type Reader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// An open, possibly authenticated, event socket session
pub struct Connection {
    reader: Reader,
    writer: Writer,
    deadline: Instant,
    authenticated: bool,
}

impl Connection {
    /// Dials the target and fixes the deadline for everything that follows.
    pub async fn open(target: &Target) -> Result<Self> {
        let deadline = Instant::now() + target.timeout();
        let address = target.address();
        debug!("Connecting to {}", address);

        match address {
            Address::Tcp(host) => {
                let stream = timeout_at(deadline, tokio::net::TcpStream::connect(host.as_str()))
                    .await
                    .map_err(|_| dial_timeout(address))?
                    .map_err(|source| ExporterError::Dial {
                        address: address.to_string(),
                        source,
                    })?;
                Ok(Self::from_stream(stream, deadline))
            }
            #[cfg(unix)]
            Address::Unix(path) => {
                let stream = timeout_at(deadline, tokio::net::UnixStream::connect(path))
                    .await
                    .map_err(|_| dial_timeout(address))?
                    .map_err(|source| ExporterError::Dial {
                        address: address.to_string(),
                        source,
                    })?;
                Ok(Self::from_stream(stream, deadline))
            }
            #[cfg(not(unix))]
            Address::Unix(_) => Err(ExporterError::Dial {
                address: address.to_string(),
                source: io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unix sockets are not available on this platform",
                ),
            }),
        }
    }

    /// Wraps an already connected stream.
    pub fn from_stream<S>(stream: S, deadline: Instant) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(Box::new(read_half)),
            writer: Box::new(write_half),
            deadline,
            authenticated: false,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Runs the password handshake.
    ///
    /// The server speaks first with an `auth/request` header block; we answer with
    /// `auth <password>` and expect a `command/reply` whose `Reply-Text` is exactly
    /// `+OK accepted`. Anything else is an authentication failure.
    pub async fn authenticate(&mut self, password: &SecretString) -> Result<()> {
        let greeting = self
            .read_headers()
            .await
            .map_err(|e| ExporterError::Auth(format!("read auth failed: {}", e)))?;

        if greeting.get(CONTENT_TYPE) != Some(AUTH_REQUEST) {
            return Err(ExporterError::Auth("unknown content-type".to_string()));
        }

        self.write_command(&format!("auth {}", password.expose_secret()))
            .await
            .map_err(|e| ExporterError::Auth(format!("write auth failed: {}", e)))?;

        let reply = self
            .read_headers()
            .await
            .map_err(|e| ExporterError::Auth(format!("read auth failed: {}", e)))?;

        if reply.get(CONTENT_TYPE) != Some(COMMAND_REPLY) {
            return Err(ExporterError::Auth("unknown reply".to_string()));
        }

        let reply_text = reply.get(REPLY_TEXT).unwrap_or_default();
        if reply_text != AUTH_ACCEPTED {
            return Err(ExporterError::Auth(reply_text.to_string()));
        }

        self.authenticated = true;
        Ok(())
    }

    /// Sends one command and returns the body of its reply.
    pub async fn exchange(&mut self, command: &str) -> Result<Vec<u8>> {
        self.write_command(command).await?;

        let headers = self.read_headers().await?;
        let length = headers
            .content_length()?
            .ok_or(ExporterError::MissingLengthHeader)?;

        let mut body = protocol::body_buffer(length);
        let read = timeout_at(
            self.deadline,
            protocol::read_body_into(&mut self.reader, length, &mut body),
        )
        .await;

        match read {
            Ok(result) => result?,
            Err(_) => {
                return Err(ExporterError::ShortRead {
                    expected: length,
                    received: body.len(),
                })
            }
        }

        debug!(command, bytes = body.len(), "Received command response");
        Ok(body)
    }

    /// Shuts down the write side; the socket is released when the connection drops.
    pub async fn close(mut self) {
        match timeout_at(self.deadline, self.writer.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Connection shutdown failed: {}", e),
            Err(_) => debug!("Connection shutdown skipped: deadline exceeded"),
        }
        debug!("Connection closed");
    }

    async fn write_command(&mut self, command: &str) -> Result<()> {
        let frame = protocol::frame_command(command);
        timeout_at(self.deadline, async {
            self.writer.write_all(frame.as_bytes()).await?;
            self.writer.flush().await
        })
        .await
        .map_err(|_| ExporterError::Write(io::Error::from(io::ErrorKind::TimedOut)))?
        .map_err(ExporterError::Write)
    }

    async fn read_headers(&mut self) -> Result<Headers> {
        timeout_at(self.deadline, protocol::read_headers(&mut self.reader))
            .await
            .map_err(|_| ExporterError::HeaderParse("deadline exceeded".to_string()))?
    }
}

fn dial_timeout(address: &Address) -> ExporterError {
    ExporterError::Dial {
        address: address.to_string(),
        source: io::Error::new(io::ErrorKind::TimedOut, "connection timed out"),
    }
}
