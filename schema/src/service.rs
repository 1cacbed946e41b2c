use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use ulid::Ulid;

use crate::{RequestError, WorkQueue, DEFAULT_QUEUE_CAPACITY};

/// Default size of a service's worker pool
pub const DEFAULT_WORKERS: usize = 10;

/// Longest request line accepted, terminator included
pub const MAX_LINE: usize = 1024;

/// Answers one request line of the protocol.
///
/// `line` has its line terminator stripped and is never empty. The handler
/// writes the complete response, including trailing newlines, to `out`.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn respond(
        &self,
        line: &str,
        out: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> io::Result<()>;
}

enum Frame {
    /// A line without its terminator is in the buffer
    Line,
    /// The line ran past `MAX_LINE` and has been skipped
    Overlong,
    Closed,
}

async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let read = (&mut *reader)
        .take(MAX_LINE as u64)
        .read_until(b'\n', buf)
        .await?;

    if read == 0 {
        return Ok(Frame::Closed);
    }

    if buf.last() != Some(&b'\n') {
        if read < MAX_LINE {
            // Final line without a terminator
            return Ok(Frame::Line);
        }
        skip_line(reader).await?;
        return Ok(Frame::Overlong);
    }

    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(Frame::Line)
}

/// Discards input up to and including the next newline, `MAX_LINE` bytes
/// at a time
async fn skip_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut rest = Vec::with_capacity(MAX_LINE);
    loop {
        rest.clear();
        let read = (&mut *reader)
            .take(MAX_LINE as u64)
            .read_until(b'\n', &mut rest)
            .await?;
        if read == 0 || rest.last() == Some(&b'\n') {
            return Ok(());
        }
    }
}

/// Serves one connection: answers each line in order until an empty line or
/// end of stream, then closes the write side.
///
/// A line that is not UTF-8 or is longer than `MAX_LINE` gets the invalid
/// request error and the connection carries on.
pub async fn serve_connection<H>(handler: &H, stream: TcpStream) -> io::Result<()>
where
    H: RequestHandler + ?Sized,
{
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        let line = match read_frame(&mut reader, &mut buf).await? {
            Frame::Closed => break,
            Frame::Overlong => {
                log::warn!("rejecting request longer than {} bytes", MAX_LINE);
                None
            }
            Frame::Line => match std::str::from_utf8(&buf) {
                Ok(line) => Some(line),
                Err(e) => {
                    log::warn!("rejecting request that is not UTF-8: {}", e);
                    None
                }
            },
        };

        match line {
            Some("") => break,
            Some(line) => {
                log::debug!("processing request: {}", line);
                handler.respond(line, &mut writer).await?;
            }
            None => {
                let error = RequestError::InvalidRequest.to_response();
                writer.write_all(error.as_bytes()).await?;
            }
        }
    }

    writer.shutdown().await
}

/// A TCP service: one acceptor feeding a fixed pool of workers through a
/// bounded `WorkQueue`
pub struct Service<H> {
    handler: Arc<H>,
    workers: usize,
    queue_capacity: usize,
}

type Connection = (TcpStream, SocketAddr);

impl<H: RequestHandler> Service<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Run with the provided number of workers (minimum 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Hold at most `capacity` accepted connections waiting for a worker
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Accepts connections on `listener` forever. Accept failures are logged
    /// and skipped.
    pub async fn run(self, listener: TcpListener) {
        self.run_until(listener, std::future::pending()).await
    }

    /// Accepts connections on `listener` until `shutdown` completes, then
    /// stops accepting, lets the workers finish every queued connection and
    /// waits for them.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let queue = Arc::new(WorkQueue::<Connection>::new(self.queue_capacity));
        let workers = self.spawn_workers(&queue);

        if let Ok(addr) = listener.local_addr() {
            log::info!(
                "accepting connections on {} with {} workers",
                addr,
                self.workers
            );
        }

        tokio::pin!(shutdown);
        loop {
            let connection = tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok(connection) => connection,
                    Err(e) => {
                        log::warn!("accept failed: {}", e);
                        continue;
                    }
                },
            };

            let enqueued = tokio::select! {
                _ = &mut shutdown => break,
                enqueued = queue.enqueue(connection) => enqueued,
            };
            if let Err((_, peer)) = enqueued {
                log::error!("work queue closed, dropping connection from {}", peer);
                break;
            }
        }

        drop(listener);
        log::info!("shutting down, {} connections left to serve", queue.len());
        queue.close();

        for worker in futures::future::join_all(workers).await {
            if let Err(e) = worker {
                log::error!("worker failed: {}", e);
            }
        }
    }

    fn spawn_workers(&self, queue: &Arc<WorkQueue<Connection>>) -> Vec<JoinHandle<()>> {
        (0..self.workers)
            .map(|worker| {
                let queue = queue.clone();
                let handler = self.handler.clone();
                tokio::spawn(async move {
                    while let Some((stream, peer)) = queue.dequeue().await {
                        let id = Ulid::new();
                        log::debug!("worker {} handling connection {} from {}", worker, id, peer);

                        match serve_connection(handler.as_ref(), stream).await {
                            Ok(()) => log::debug!("connection {} closed", id),
                            Err(e) => log::warn!("connection {} from {} failed: {}", id, peer, e),
                        }
                    }
                })
            })
            .collect()
    }
}
