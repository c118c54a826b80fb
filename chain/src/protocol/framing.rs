//! Frame-level I/O: `length(2 bytes, big-endian) ‖ payload(length bytes)`.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::FramingError;

/// Maximum message size: a 16-bit length prefix can address at most this
/// many payload bytes.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Writes `bytes` as a single length-prefixed frame. Fails without writing
/// anything if `bytes` exceeds `MAX_FRAME_LEN`.
pub async fn write_frame<W>(writer: &mut W, bytes: &[u8]) -> Result<(), FramingError>
where
    W: AsyncWrite + Unpin,
{
    if bytes.len() > MAX_FRAME_LEN {
        return Err(FramingError::Overflow);
    }
    writer.write_all(&(bytes.len() as u16).to_be_bytes()).await?;
    writer.write_all(bytes).await?;
    Ok(())
}

/// Reads exactly one length-prefixed frame. A short read (including a
/// clean disconnect before or during a frame) is reported as an I/O error;
/// the caller treats any error here as fatal for the connection.
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, FramingError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 2];
    reader.read_exact(&mut len_buf).await?;
    let len = u16::from_be_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}
