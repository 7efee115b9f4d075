// src/exec/drain.rs

//! Output draining for child stdout/stderr.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::warn;

use super::context::ChunkCallback;

/// Read size for each chunk pulled from a pipe.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Which of our own streams a drained pipe is mirrored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tee {
    Stdout,
    Stderr,
}

/// Read `reader` to EOF, returning every byte in order.
///
/// Each chunk is mirrored to `tee` (if any) and handed to `callback` (if
/// any) before the next read. Tee write failures are logged and otherwise
/// ignored.
pub async fn drain<R>(mut reader: R, tee: Option<Tee>, callback: Option<ChunkCallback>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut collected = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "error reading child output; treating as EOF");
                break;
            }
        };

        let chunk = &buf[..n];
        collected.extend_from_slice(chunk);

        if let Some(tee) = tee {
            if let Err(e) = mirror(tee, chunk).await {
                warn!(error = %e, ?tee, "failed to tee child output");
            }
        }
        if let Some(cb) = &callback {
            cb(chunk);
        }
    }

    collected
}

async fn mirror(tee: Tee, chunk: &[u8]) -> std::io::Result<()> {
    match tee {
        Tee::Stdout => {
            let mut out = tokio::io::stdout();
            out.write_all(chunk).await?;
            out.flush().await
        }
        Tee::Stderr => {
            let mut err = tokio::io::stderr();
            err.write_all(chunk).await?;
            err.flush().await
        }
    }
}
