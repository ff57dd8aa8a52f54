//! Length-prefixed message framing
//!
//! Every message on the bidirectional stream is `[u32 LE length][payload]`.

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::game::constants::net::MAX_MESSAGE_SIZE;

/// Errors that can occur during message framing
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Message too large: {0} bytes (max {1})")]
    MessageTooLarge(usize, usize),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn map_eof(e: io::Error) -> FramingError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        FramingError::ConnectionClosed
    } else {
        FramingError::Io(e)
    }
}

/// Read one framed message
pub async fn read_message<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>, FramingError> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await.map_err(map_eof)?;

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(FramingError::MessageTooLarge(len, MAX_MESSAGE_SIZE));
    }
    if len == 0 {
        return Ok(Vec::new());
    }

    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await.map_err(map_eof)?;
    Ok(buf)
}

/// Write one framed message and flush
pub async fn write_message<W: AsyncWrite + Unpin>(
    stream: &mut W,
    data: &[u8],
) -> Result<(), FramingError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(FramingError::MessageTooLarge(data.len(), MAX_MESSAGE_SIZE));
    }

    let len_bytes = (data.len() as u32).to_le_bytes();
    stream.write_all(&len_bytes).await?;
    stream.write_all(data).await?;
    stream.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::protocol::{decode, encode, ClientMessage};
    use std::io::Cursor;

    #[tokio::test]
    async fn test_read_write_message() {
        let data = b"Hello, World!";
        let mut buffer = Vec::new();

        write_message(&mut buffer, data).await.unwrap();
        assert_eq!(&buffer[..4], &13u32.to_le_bytes());

        let mut cursor = Cursor::new(buffer);
        let result = read_message(&mut cursor).await.unwrap();
        assert_eq!(result, data);
    }

    #[tokio::test]
    async fn test_empty_message() {
        let mut buffer = Vec::new();
        write_message(&mut buffer, b"").await.unwrap();

        let mut cursor = Cursor::new(buffer);
        let result = read_message(&mut cursor).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_message_too_large() {
        let large_data = vec![0u8; MAX_MESSAGE_SIZE + 1];
        let mut buffer = Vec::new();

        let result = write_message(&mut buffer, &large_data).await;
        assert!(matches!(result, Err(FramingError::MessageTooLarge(_, _))));
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_read_rejects_oversized_length() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&((MAX_MESSAGE_SIZE as u32) + 1).to_le_bytes());
        let mut cursor = Cursor::new(buffer);

        let err = read_message(&mut cursor).await.unwrap_err();
        assert!(matches!(err, FramingError::MessageTooLarge(_, _)));
    }

    #[tokio::test]
    async fn test_read_truncated_length() {
        let mut cursor = Cursor::new(vec![0u8; 2]);
        let result = read_message(&mut cursor).await;
        assert!(matches!(result, Err(FramingError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_read_truncated_payload() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&10u32.to_le_bytes());
        buffer.extend_from_slice(&[1, 2, 3]);

        let mut cursor = Cursor::new(buffer);
        let result = read_message(&mut cursor).await;
        assert!(matches!(result, Err(FramingError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_client_messages_on_one_stream() {
        let messages = vec![
            ClientMessage::CreateGame,
            ClientMessage::MouseMove { dx: 3.0 },
            ClientMessage::Click,
        ];

        let mut buffer = Vec::new();
        for msg in &messages {
            write_message(&mut buffer, &encode(msg).unwrap()).await.unwrap();
        }

        let mut cursor = Cursor::new(buffer);
        for expected in &messages {
            let payload = read_message(&mut cursor).await.unwrap();
            let decoded: ClientMessage = decode(&payload).unwrap();
            assert_eq!(&decoded, expected);
        }
        assert!(matches!(
            read_message(&mut cursor).await,
            Err(FramingError::ConnectionClosed)
        ));
    }
}
