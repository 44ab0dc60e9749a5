//! Content-Length framed JSON-RPC messages over the server's stdio.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::{Result, SessionError};

/// Write one framed message.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, message: &Value) -> Result<()> {
    let content = serde_json::to_string(message)?;
    let header = format!("Content-Length: {}\r\n\r\n", content.len());

    writer.write_all(header.as_bytes()).await?;
    writer.write_all(content.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed message. Returns `None` on a clean EOF before any header.
pub async fn read_message<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<Value>> {
    let mut content_length: usize = 0;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            content_length = value
                .trim()
                .parse()
                .map_err(|e| SessionError::Protocol(format!("invalid Content-Length: {e}")))?;
        }
    }

    if content_length == 0 {
        return Err(SessionError::Protocol(
            "message without Content-Length header".to_string(),
        ));
    }

    let mut content = vec![0u8; content_length];
    reader.read_exact(&mut content).await?;
    Ok(Some(serde_json::from_slice(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn messages_round_trip_through_framing() {
        let message = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}});

        let mut buffer: Vec<u8> = Vec::new();
        write_message(&mut buffer, &message).await.unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("Content-Length: "));
        assert!(text.contains("\r\n\r\n"));

        let mut reader = BufReader::new(buffer.as_slice());
        let read_back = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(read_back, message);
    }

    #[tokio::test]
    async fn read_message_returns_none_on_eof() {
        let mut reader = BufReader::new(&b""[..]);
        assert!(read_message(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_message_rejects_missing_content_length() {
        let mut reader = BufReader::new(&b"X-Other: 1\r\n\r\n"[..]);
        let err = read_message(&mut reader).await.unwrap_err();
        assert!(matches!(err, SessionError::Protocol(_)));
    }

    #[tokio::test]
    async fn read_message_handles_consecutive_messages() {
        let first = json!({"jsonrpc": "2.0", "method": "window/logMessage", "params": {"message": "hi"}});
        let second = json!({"jsonrpc": "2.0", "id": 2, "result": null});

        let mut buffer: Vec<u8> = Vec::new();
        write_message(&mut buffer, &first).await.unwrap();
        write_message(&mut buffer, &second).await.unwrap();

        let mut reader = BufReader::new(buffer.as_slice());
        assert_eq!(read_message(&mut reader).await.unwrap().unwrap(), first);
        assert_eq!(read_message(&mut reader).await.unwrap().unwrap(), second);
        assert!(read_message(&mut reader).await.unwrap().is_none());
    }
}
