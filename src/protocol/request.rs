use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// A fully framed request. A PUT body is still raw bytes here; JSON
/// parsing happens at dispatch so a payload failure can be reported
/// differently from a framing failure.
#[derive(Debug)]
pub enum Request {
    Put {
        path: String,
        lamport: Option<u64>,
        body: BytesMut,
    },
    Get {
        path: String,
        lamport: Option<u64>,
    },
}

/// Framing failures. Everything here maps to a 400 except `Io`, which
/// means the connection itself broke and gets no response at all.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("connection closed before a request line arrived")]
    Empty,
    #[error("unrecognized verb {0:?}")]
    BadVerb(String),
    #[error("PUT without a usable Content-Length")]
    MissingLength,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

enum Verb {
    Put,
    Get,
}

/// Read one request through its framing phases: request line, then
/// headers until a blank line, then (PUT only) exactly Content-Length
/// bytes of body. A declared length that has not arrived yet blocks
/// until it does or the connection fails; there is no partial-body
/// tolerance.
pub async fn read_request<R>(reader: &mut R) -> Result<Request, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    // -- request line --
    let line = read_line(reader).await?.ok_or(RequestError::Empty)?;
    let mut parts = line.split_whitespace();
    let verb = match parts.next() {
        Some("PUT") => Verb::Put,
        Some("GET") => Verb::Get,
        Some(other) => return Err(RequestError::BadVerb(other.to_string())),
        None => return Err(RequestError::Empty),
    };
    let path = parts.next().unwrap_or("/").to_string();

    // -- headers --
    let mut content_length: Option<usize> = None;
    let mut lamport: Option<u64> = None;
    while let Some(line) = read_line(reader).await? {
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse().ok();
        } else if name.eq_ignore_ascii_case("lamport-clock") {
            lamport = value.parse().ok();
        }
        // every other header is ignored
    }

    // -- body --
    match verb {
        Verb::Get => Ok(Request::Get { path, lamport }),
        Verb::Put => {
            let len = match content_length {
                Some(len) if len > 0 => len,
                _ => return Err(RequestError::MissingLength),
            };
            let mut body = BytesMut::zeroed(len);
            reader.read_exact(&mut body).await?;
            Ok(Request::Put {
                path,
                lamport,
                body,
            })
        }
    }
}

/// One line with the terminator stripped; accepts `\r\n` and bare
/// `\n`. `None` at end of stream.
async fn read_line<R>(reader: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(input: &[u8]) -> Result<Request, RequestError> {
        let mut reader = BufReader::new(input);
        read_request(&mut reader).await
    }

    #[tokio::test]
    async fn put_with_body_and_clock() {
        let body = r#"{"id":"IDS60901","air_temp":"20.5"}"#;
        let input = format!(
            "PUT /weather.json HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\nLamport-Clock: 7\r\n\r\n{}",
            body.len(),
            body,
        );

        match parse(input.as_bytes()).await.unwrap() {
            Request::Put {
                path,
                lamport,
                body: parsed,
            } => {
                assert_eq!(path, "/weather.json");
                assert_eq!(lamport, Some(7));
                assert_eq!(&parsed[..], body.as_bytes());
            }
            other => panic!("expected PUT, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_without_headers() {
        match parse(b"GET /weather.json HTTP/1.1\r\n\r\n").await.unwrap() {
            Request::Get { path, lamport } => {
                assert_eq!(path, "/weather.json");
                assert_eq!(lamport, None);
            }
            other => panic!("expected GET, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bare_newlines_are_accepted() {
        let body = r#"{"id":"x"}"#;
        let input = format!("PUT /weather.json HTTP/1.1\nContent-Length: {}\n\n{}", body.len(), body);
        match parse(input.as_bytes()).await.unwrap() {
            Request::Put { body: parsed, .. } => assert_eq!(&parsed[..], body.as_bytes()),
            other => panic!("expected PUT, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_verb_is_rejected() {
        let err = parse(b"DELETE /weather.json HTTP/1.1\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, RequestError::BadVerb(verb) if verb == "DELETE"));
    }

    #[tokio::test]
    async fn closed_stream_is_empty() {
        let err = parse(b"").await.unwrap_err();
        assert!(matches!(err, RequestError::Empty));
    }

    #[tokio::test]
    async fn put_with_zero_length_is_missing_length() {
        let err = parse(b"PUT /weather.json HTTP/1.1\r\nContent-Length: 0\r\n\r\n")
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::MissingLength));
    }

    #[tokio::test]
    async fn put_without_length_header_is_missing_length() {
        let err = parse(b"PUT /weather.json HTTP/1.1\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, RequestError::MissingLength));
    }

    #[tokio::test]
    async fn truncated_body_is_an_io_error() {
        let err = parse(b"PUT /weather.json HTTP/1.1\r\nContent-Length: 50\r\n\r\nshort")
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Io(_)));
    }

    #[tokio::test]
    async fn unrecognized_headers_are_ignored() {
        let body = r#"{"id":"x"}"#;
        let input = format!(
            "PUT /weather.json HTTP/1.1\r\nHost: localhost\r\nUser-Agent: ContentServer/1.0\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body,
        );
        assert!(matches!(parse(input.as_bytes()).await.unwrap(), Request::Put { .. }));
    }
}
