//! Persistent line-oriented TCP feed client.
//!
//! Each feed gets exactly one [`FeedConnection`] driven by [`run_feed`],
//! which owns the Disconnected → Connecting → Connected state machine. The
//! two feeds have very different health semantics — the activation feed is
//! legitimately silent for hours while the skimmer feed chatters constantly —
//! so "no data for a while" is split into two thresholds: a per-read idle
//! timeout (not an error) and an inactivity timeout that declares the link
//! dead.

#![allow(async_fn_in_trait)]

pub mod error;

pub use error::{Error, Result};

use std::time::Duration;

use tokio::{
  io::{AsyncReadExt, AsyncWriteExt},
  net::TcpStream,
  sync::watch,
  time::{Instant, timeout},
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings for one feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
  /// Short name used in log events ("activation", "skimmer").
  pub name:               String,
  pub host:               String,
  pub port:               u16,
  /// Identification line sent immediately after connect.
  pub login:              String,
  /// Upper bound on a single blocking read. Expiry is not an error.
  pub idle_timeout:       Duration,
  /// Silence span after which the link is presumed dead and reconnected.
  pub inactivity_timeout: Duration,
  /// Fixed wait between failed connection attempts.
  pub reconnect_backoff:  Duration,
}

/// Result of one bounded read while connected.
#[derive(Debug)]
pub enum ReadOutcome {
  /// A complete line, CR/LF stripped.
  Line(String),
  /// The idle timeout expired with no data. Connection is still up.
  Idle,
  /// The server closed the stream.
  Closed,
}

// ─── Connection ──────────────────────────────────────────────────────────────

/// One persistent socket to a feed server.
///
/// Holding `None` is the Disconnected state; [`connect`](Self::connect) moves
/// through Connecting into Connected. `pending` accumulates bytes that have
/// arrived but do not yet form a complete line; it belongs to the connection,
/// not to any single read, so an expiring read never discards a line in
/// flight.
pub struct FeedConnection {
  config:  FeedConfig,
  stream:  Option<TcpStream>,
  pending: Vec<u8>,
}

impl FeedConnection {
  pub fn new(config: FeedConfig) -> Self {
    Self { config, stream: None, pending: Vec::new() }
  }

  pub fn is_connected(&self) -> bool {
    self.stream.is_some()
  }

  /// Open the socket and send the identification line.
  pub async fn connect(&mut self) -> Result<()> {
    let address = (self.config.host.as_str(), self.config.port);
    let mut stream = TcpStream::connect(address).await?;
    stream
      .write_all(format!("{}\r\n", self.config.login).as_bytes())
      .await?;
    self.pending.clear();
    self.stream = Some(stream);
    Ok(())
  }

  /// Read one line, bounded by the idle timeout.
  ///
  /// Bytes arrive in whatever chunks the network delivers; a partial line is
  /// held in the connection's buffer across calls, and an expired timeout
  /// leaves it intact.
  pub async fn read_line(&mut self) -> Result<ReadOutcome> {
    let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

    loop {
      if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
        while matches!(line.last(), Some(b'\r' | b'\n')) {
          line.pop();
        }
        return Ok(ReadOutcome::Line(
          String::from_utf8_lossy(&line).into_owned(),
        ));
      }

      match timeout(
        self.config.idle_timeout,
        stream.read_buf(&mut self.pending),
      )
      .await
      {
        Err(_elapsed) => return Ok(ReadOutcome::Idle),
        Ok(Ok(0)) => return Ok(ReadOutcome::Closed),
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(e.into()),
      }
    }
  }

  /// Drop the socket, returning to Disconnected. Safe to call repeatedly.
  pub fn disconnect(&mut self) {
    self.stream = None;
    self.pending.clear();
  }
}

// ─── Reader loop ─────────────────────────────────────────────────────────────

/// Receives each complete, non-empty line a feed delivers.
pub trait LineSink: Send + Sync {
  async fn deliver(&self, line: &str);
}

/// Drive one feed until shutdown: connect with fixed-backoff retry, read
/// lines, hand them to `sink`, and reconnect whenever the link errors out or
/// goes silent past its inactivity threshold.
///
/// Transport failures never escape this loop; they are logged and retried
/// indefinitely.
pub async fn run_feed(
  config: FeedConfig,
  sink: &impl LineSink,
  mut shutdown: watch::Receiver<bool>,
) {
  let name = config.name.clone();
  let backoff = config.reconnect_backoff;
  let inactivity_timeout = config.inactivity_timeout;

  let mut conn = FeedConnection::new(config);
  let mut last_activity = Instant::now();

  loop {
    if *shutdown.borrow() {
      break;
    }

    if !conn.is_connected() {
      match conn.connect().await {
        Ok(()) => {
          tracing::info!(feed = %name, "connected");
          last_activity = Instant::now();
        }
        Err(e) => {
          tracing::warn!(feed = %name, error = %e, "connect failed, backing off");
          tokio::select! {
            _ = shutdown.changed() => break,
            _ = tokio::time::sleep(backoff) => {}
          }
          continue;
        }
      }
    }

    tokio::select! {
      _ = shutdown.changed() => break,
      outcome = conn.read_line() => match outcome {
        Ok(ReadOutcome::Line(line)) => {
          last_activity = Instant::now();
          if !line.trim().is_empty() {
            sink.deliver(&line).await;
          }
        }
        Ok(ReadOutcome::Idle) => {
          // Quiet is fine; only prolonged silence means the link is dead.
          if last_activity.elapsed() > inactivity_timeout {
            tracing::warn!(
              feed = %name,
              silent_for = ?last_activity.elapsed(),
              "inactivity threshold exceeded, reconnecting"
            );
            conn.disconnect();
          }
        }
        Ok(ReadOutcome::Closed) => {
          tracing::warn!(feed = %name, "server closed the stream, reconnecting");
          conn.disconnect();
        }
        Err(e) => {
          tracing::warn!(feed = %name, error = %e, "read error, reconnecting");
          conn.disconnect();
        }
      }
    }
  }

  conn.disconnect();
  tracing::info!(feed = %name, "reader loop stopped");
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  use tokio::{io::AsyncWriteExt, net::TcpListener};

  fn config(port: u16) -> FeedConfig {
    FeedConfig {
      name:               "test".to_string(),
      host:               "127.0.0.1".to_string(),
      port,
      login:              "N0CALL".to_string(),
      idle_timeout:       Duration::from_millis(100),
      inactivity_timeout: Duration::from_secs(60),
      reconnect_backoff:  Duration::from_millis(10),
    }
  }

  struct Collected(Mutex<Vec<String>>);

  impl LineSink for Collected {
    async fn deliver(&self, line: &str) {
      self.0.lock().unwrap().push(line.to_string());
    }
  }

  #[tokio::test]
  async fn connect_sends_login_and_reads_lines() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = [0u8; 64];
      let n = tokio::io::AsyncReadExt::read(&mut socket, &mut buf)
        .await
        .unwrap();
      assert_eq!(&buf[..n], b"N0CALL\r\n");
      socket.write_all(b"hello world\r\n").await.unwrap();
    });

    let mut conn = FeedConnection::new(config(port));
    conn.connect().await.unwrap();
    match conn.read_line().await.unwrap() {
      ReadOutcome::Line(line) => assert_eq!(line, "hello world"),
      other => panic!("unexpected outcome: {other:?}"),
    }

    server.await.unwrap();
  }

  #[tokio::test]
  async fn quiet_connection_reports_idle_not_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
      let (_socket, _) = listener.accept().await.unwrap();
      tokio::time::sleep(Duration::from_millis(400)).await;
    });

    let mut conn = FeedConnection::new(config(port));
    conn.connect().await.unwrap();
    assert!(matches!(conn.read_line().await.unwrap(), ReadOutcome::Idle));

    server.await.unwrap();
  }

  #[tokio::test]
  async fn partial_line_survives_idle_timeouts() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = [0u8; 64];
      let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
      // Half a line, a silence longer than the idle timeout, then the rest.
      socket.write_all(b"hello ").await.unwrap();
      tokio::time::sleep(Duration::from_millis(300)).await;
      socket.write_all(b"world\r\n").await.unwrap();
      tokio::time::sleep(Duration::from_millis(200)).await;
    });

    let mut conn = FeedConnection::new(config(port));
    conn.connect().await.unwrap();

    let mut saw_idle = false;
    loop {
      match conn.read_line().await.unwrap() {
        ReadOutcome::Idle => saw_idle = true,
        ReadOutcome::Line(line) => {
          assert_eq!(line, "hello world");
          break;
        }
        other => panic!("unexpected outcome: {other:?}"),
      }
    }
    assert!(saw_idle, "the silence should have produced at least one Idle");

    server.await.unwrap();
  }

  #[tokio::test]
  async fn multiple_lines_in_one_chunk_are_split() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = [0u8; 64];
      let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
      socket.write_all(b"first\r\nsecond\r\n").await.unwrap();
      tokio::time::sleep(Duration::from_millis(200)).await;
    });

    let mut conn = FeedConnection::new(config(port));
    conn.connect().await.unwrap();

    for expected in ["first", "second"] {
      match conn.read_line().await.unwrap() {
        ReadOutcome::Line(line) => assert_eq!(line, expected),
        other => panic!("unexpected outcome: {other:?}"),
      }
    }

    server.await.unwrap();
  }

  #[tokio::test]
  async fn server_close_reports_closed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      // Consume the login line, then close cleanly.
      let mut buf = [0u8; 64];
      let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
      drop(socket);
    });

    let mut conn = FeedConnection::new(config(port));
    conn.connect().await.unwrap();
    assert!(matches!(conn.read_line().await.unwrap(), ReadOutcome::Closed));

    server.await.unwrap();
  }

  #[tokio::test]
  async fn read_while_disconnected_is_an_error() {
    let mut conn = FeedConnection::new(config(1));
    assert!(matches!(
      conn.read_line().await,
      Err(Error::NotConnected)
    ));
  }

  #[tokio::test]
  async fn run_feed_delivers_lines_and_honors_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      socket.write_all(b"spot one\r\nspot two\r\n").await.unwrap();
      tokio::time::sleep(Duration::from_millis(500)).await;
    });

    let sink = Collected(Mutex::new(Vec::new()));
    let (tx, rx) = watch::channel(false);

    let loop_fut = run_feed(config(port), &sink, rx);
    let stop_fut = async {
      tokio::time::sleep(Duration::from_millis(250)).await;
      tx.send(true).unwrap();
    };
    tokio::join!(loop_fut, stop_fut);

    let lines = sink.0.lock().unwrap().clone();
    assert_eq!(lines, vec!["spot one".to_string(), "spot two".to_string()]);

    server.await.unwrap();
  }
}
