//! Minimal RESP2 wire codec
//!
//! Commands go out as arrays of bulk strings; replies come back as one of
//! the five RESP2 frame types. The client only issues GET, SETEX, and
//! SELECT, but the reply parser accepts every frame type so an unexpected
//! answer surfaces as a typed reply instead of a desynced stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use super::errors::{StoreError, StoreResult};

/// Upper bound on a single bulk frame; larger replies are protocol errors
pub const MAX_BULK_LEN: usize = 512 * 1024;

/// One parsed reply frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `+OK` style status line
    Simple(String),
    /// `-ERR ...` server-reported failure
    Error(String),
    /// `:n` integer
    Int(i64),
    /// `$n` bulk string
    Bulk(String),
    /// `$-1` or `*-1` null
    Nil,
    /// `*n` array of scalar frames
    Array(Vec<Reply>),
}

/// Encode one command as an array of bulk strings
pub fn encode_command(args: &[&str]) -> Vec<u8> {
    let mut out = Vec::with_capacity(args.iter().map(|a| a.len() + 16).sum());
    out.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        out.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        out.extend_from_slice(arg.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Read one reply frame from the stream
pub async fn read_reply<R>(reader: &mut R) -> StoreResult<Reply>
where
    R: AsyncBufRead + Unpin,
{
    let line = read_line(reader).await?;
    if let Some(header) = line.strip_prefix('*') {
        let Some(len) = parse_len(header)? else {
            return Ok(Reply::Nil);
        };
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            let inner = read_line(reader).await?;
            items.push(read_scalar(reader, &inner).await?);
        }
        return Ok(Reply::Array(items));
    }
    read_scalar(reader, &line).await
}

/// Parse one non-array frame whose header line was already consumed
async fn read_scalar<R>(reader: &mut R, line: &str) -> StoreResult<Reply>
where
    R: AsyncBufRead + Unpin,
{
    match line.as_bytes().first() {
        Some(b'+') => Ok(Reply::Simple(line[1..].to_string())),
        Some(b'-') => Ok(Reply::Error(line[1..].to_string())),
        Some(b':') => line[1..]
            .parse()
            .map(Reply::Int)
            .map_err(|_| StoreError::Protocol(format!("bad integer reply: {line:?}"))),
        Some(b'$') => match parse_len(&line[1..])? {
            None => Ok(Reply::Nil),
            Some(len) => read_bulk_body(reader, len).await,
        },
        Some(b'*') => Err(StoreError::Protocol(
            "nested array replies are not supported".to_string(),
        )),
        _ => Err(StoreError::Protocol(format!("unknown reply frame: {line:?}"))),
    }
}

async fn read_bulk_body<R>(reader: &mut R, len: usize) -> StoreResult<Reply>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = vec![0u8; len + 2];
    reader.read_exact(&mut buf).await?;
    if !buf.ends_with(b"\r\n") {
        return Err(StoreError::Protocol(
            "bulk frame missing terminator".to_string(),
        ));
    }
    buf.truncate(len);
    String::from_utf8(buf)
        .map(Reply::Bulk)
        .map_err(|_| StoreError::Protocol("bulk frame is not valid utf-8".to_string()))
}

/// Length header: a non-negative count, or `-1` meaning null
fn parse_len(header: &str) -> StoreResult<Option<usize>> {
    if header == "-1" {
        return Ok(None);
    }
    let len: usize = header
        .parse()
        .map_err(|_| StoreError::Protocol(format!("bad length header: {header:?}")))?;
    if len > MAX_BULK_LEN {
        return Err(StoreError::Protocol(format!(
            "frame length {len} exceeds limit {MAX_BULK_LEN}"
        )));
    }
    Ok(Some(len))
}

async fn read_line<R>(reader: &mut R) -> StoreResult<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(StoreError::Protocol(
            "connection closed mid-reply".to_string(),
        ));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse(bytes: &[u8]) -> StoreResult<Reply> {
        let mut reader = bytes;
        read_reply(&mut reader).await
    }

    #[test]
    fn test_encode_get() {
        let encoded = encode_command(&["GET", "uid:abc"]);
        assert_eq!(encoded, b"*2\r\n$3\r\nGET\r\n$7\r\nuid:abc\r\n");
    }

    #[test]
    fn test_encode_setex() {
        let encoded = encode_command(&["SETEX", "k", "3600", "3.0"]);
        assert_eq!(
            encoded,
            b"*4\r\n$5\r\nSETEX\r\n$1\r\nk\r\n$4\r\n3600\r\n$3\r\n3.0\r\n"
        );
    }

    #[tokio::test]
    async fn test_parse_simple_and_error() {
        assert_eq!(
            parse(b"+OK\r\n").await.unwrap(),
            Reply::Simple("OK".to_string())
        );
        assert_eq!(
            parse(b"-ERR unknown command\r\n").await.unwrap(),
            Reply::Error("ERR unknown command".to_string())
        );
    }

    #[tokio::test]
    async fn test_parse_int() {
        assert_eq!(parse(b":42\r\n").await.unwrap(), Reply::Int(42));
        assert_eq!(parse(b":-1\r\n").await.unwrap(), Reply::Int(-1));
        assert!(parse(b":abc\r\n").await.is_err());
    }

    #[tokio::test]
    async fn test_parse_bulk() {
        assert_eq!(
            parse(b"$5\r\nhello\r\n").await.unwrap(),
            Reply::Bulk("hello".to_string())
        );
        assert_eq!(
            parse(b"$0\r\n\r\n").await.unwrap(),
            Reply::Bulk(String::new())
        );
    }

    #[tokio::test]
    async fn test_parse_nil() {
        assert_eq!(parse(b"$-1\r\n").await.unwrap(), Reply::Nil);
        assert_eq!(parse(b"*-1\r\n").await.unwrap(), Reply::Nil);
    }

    #[tokio::test]
    async fn test_parse_array() {
        let reply = parse(b"*3\r\n$4\r\ncars\r\n$5\r\nmusic\r\n:7\r\n")
            .await
            .unwrap();
        assert_eq!(
            reply,
            Reply::Array(vec![
                Reply::Bulk("cars".to_string()),
                Reply::Bulk("music".to_string()),
                Reply::Int(7),
            ])
        );
    }

    #[tokio::test]
    async fn test_nested_array_rejected() {
        let result = parse(b"*1\r\n*1\r\n:1\r\n").await;
        assert!(matches!(result, Err(StoreError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_truncated_frame() {
        assert!(parse(b"$5\r\nhe").await.is_err());
        assert!(parse(b"").await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let header = format!("${}\r\n", MAX_BULK_LEN + 1);
        assert!(matches!(
            parse(header.as_bytes()).await,
            Err(StoreError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_bulk_terminator() {
        assert!(matches!(
            parse(b"$2\r\nhiXX").await,
            Err(StoreError::Protocol(_))
        ));
    }
}
