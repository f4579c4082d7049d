use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

const READ_BUFFER_SIZE: usize = 4096;
const IDLE_SLEEP: Duration = Duration::from_millis(1);

#[derive(Debug, Error)]
#[error("failed to connect to {addr}: {source}")]
pub struct ConnectError {
    addr: String,
    source: io::Error,
}

type Inbox = Arc<Mutex<VecDeque<String>>>;

/// Owns the stream socket for one session. A background thread drains the
/// socket into the shared inbox; the main loop drains the inbox once per
/// tick. The inbox mutex is the only state shared between the two, held only
/// for the enqueue/dequeue itself.
pub struct Connection {
    stream: TcpStream,
    inbox: Inbox,
    running: Arc<AtomicBool>,
    disconnected: Arc<AtomicBool>,
    receive_thread: Option<JoinHandle<()>>,
}

impl Connection {
    /// Synchronous blocking connect. On success the receive thread is
    /// already running against a non-blocking clone of the socket.
    pub fn connect(host: &str, port: u16) -> Result<Self, ConnectError> {
        let addr = format!("{host}:{port}");
        let wrap = |source: io::Error| ConnectError {
            addr: addr.clone(),
            source,
        };

        let stream = TcpStream::connect(&addr).map_err(wrap)?;
        stream.set_nodelay(true).map_err(wrap)?;

        let reader = stream.try_clone().map_err(wrap)?;
        reader.set_nonblocking(true).map_err(wrap)?;

        let inbox: Inbox = Arc::new(Mutex::new(VecDeque::new()));
        let running = Arc::new(AtomicBool::new(true));
        let disconnected = Arc::new(AtomicBool::new(false));

        let thread_inbox = Arc::clone(&inbox);
        let thread_running = Arc::clone(&running);
        let thread_disconnected = Arc::clone(&disconnected);
        let receive_thread = thread::Builder::new()
            .name("duet-receive".to_string())
            .spawn(move || {
                receive_loop(reader, thread_inbox, thread_running, thread_disconnected)
            })
            .map_err(wrap)?;

        info!("connected to {}", addr);

        Ok(Self {
            stream,
            inbox,
            running,
            disconnected,
            receive_thread: Some(receive_thread),
        })
    }

    /// Best-effort send of an already-encoded record. A write failure marks
    /// the connection lost instead of surfacing an error; there is no retry
    /// and no queuing.
    pub fn send(&mut self, record: &str) {
        if self.disconnected.load(Ordering::Relaxed) {
            return;
        }

        if let Err(e) = self.stream.write_all(record.as_bytes()) {
            // The socket is non-blocking (shared flag with the reader clone),
            // so a full send buffer degrades to a dropped write.
            if e.kind() == io::ErrorKind::WouldBlock {
                debug!("send buffer full, dropping record");
            } else {
                debug!("send failed, marking connection lost: {}", e);
                self.disconnected.store(true, Ordering::Relaxed);
            }
        }
    }

    /// Removes and returns all pending chunks in arrival order.
    pub fn drain(&self) -> Vec<String> {
        let mut inbox = lock_inbox(&self.inbox);
        inbox.drain(..).collect()
    }

    /// True once the receive loop has observed EOF or an I/O error, or a
    /// send has failed.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Relaxed)
    }

    /// Stops the receive loop without tearing down the socket: the write
    /// half stays usable for a final EXIT. Once the game is over no further
    /// inbound records matter, so the thread is told to wind down early.
    pub fn stop_receiving(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Idempotent teardown: signals the receive loop, closes the socket to
    /// unblock it, and joins the thread.
    pub fn close(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        let _ = self.stream.shutdown(Shutdown::Both);

        if let Some(handle) = self.receive_thread.take() {
            if handle.join().is_err() {
                warn!("receive thread panicked during shutdown");
            }
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

fn lock_inbox(inbox: &Inbox) -> MutexGuard<'_, VecDeque<String>> {
    // The producer only pushes strings; a poisoned lock leaves the queue
    // intact, so recover it.
    inbox.lock().unwrap_or_else(|e| e.into_inner())
}

/// Background half of the connection: read up to 4096 bytes at a time,
/// lossy-decode to text, enqueue. Cooperative exit via the running flag;
/// EOF and hard errors end the loop silently apart from the flag.
fn receive_loop(
    mut stream: TcpStream,
    inbox: Inbox,
    running: Arc<AtomicBool>,
    disconnected: Arc<AtomicBool>,
) {
    let mut buffer = [0u8; READ_BUFFER_SIZE];

    while running.load(Ordering::Relaxed) {
        match stream.read(&mut buffer) {
            Ok(0) => {
                debug!("server closed the connection");
                disconnected.store(true, Ordering::Relaxed);
                break;
            }
            Ok(n) => {
                let chunk = String::from_utf8_lossy(&buffer[..n]).into_owned();
                lock_inbox(&inbox).push_back(chunk);
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(IDLE_SLEEP);
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                if running.load(Ordering::Relaxed) {
                    warn!("receive failed: {}", e);
                }
                disconnected.store(true, Ordering::Relaxed);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Instant;

    fn wait_for<F: FnMut() -> bool>(mut ready: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if ready() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_loopback_chunks_arrive_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"STATE 1\n").unwrap();
            socket.write_all(b"STATE 2\nSTA").unwrap();
            socket.write_all(b"TE 3\n").unwrap();
            socket
        });

        let connection = Connection::connect("127.0.0.1", port).unwrap();
        let socket = server.join().unwrap();

        let mut received = String::new();
        assert!(wait_for(|| {
            for chunk in connection.drain() {
                received.push_str(&chunk);
            }
            received == "STATE 1\nSTATE 2\nSTATE 3\n"
        }));

        drop(socket);
    }

    #[test]
    fn test_eof_sets_disconnected_flag() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            drop(socket);
        });

        let connection = Connection::connect("127.0.0.1", port).unwrap();
        server.join().unwrap();

        assert!(wait_for(|| connection.is_disconnected()));
    }

    #[test]
    fn test_stop_receiving_exits_thread_but_keeps_socket_writable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            socket.write_all(b"GAMEOVER 0 7 3\n").unwrap();
            let mut buf = [0u8; 64];
            let n = socket.read(&mut buf).unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });

        let mut connection = Connection::connect("127.0.0.1", port).unwrap();

        let mut received = String::new();
        assert!(wait_for(|| {
            for chunk in connection.drain() {
                received.push_str(&chunk);
            }
            received == "GAMEOVER 0 7 3\n"
        }));

        connection.stop_receiving();
        assert!(wait_for(|| {
            connection
                .receive_thread
                .as_ref()
                .is_none_or(|handle| handle.is_finished())
        }));

        connection.send("EXIT\n");
        assert_eq!(server.join().unwrap(), "EXIT\n");

        connection.close();
    }

    #[test]
    fn test_close_is_idempotent_and_joins() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(50));
            drop(socket);
        });

        let mut connection = Connection::connect("127.0.0.1", port).unwrap();
        connection.close();
        assert!(connection.receive_thread.is_none());
        connection.close();

        server.join().unwrap();
    }
}
