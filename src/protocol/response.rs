use std::fmt::Write as _;

use serde_json::{Map, Value};

use super::{HEADER_CONTENT_LENGTH, HEADER_CONTENT_TYPE, HEADER_LAMPORT_CLOCK};

/// The four outcomes a request can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 200: read served.
    Ok,
    /// 201: write stored.
    Created,
    /// 400: framing error, nothing read beyond it.
    BadRequest,
    /// 500: body arrived but did not parse into a usable reading.
    ServerError,
}

impl Status {
    pub fn line(self) -> &'static str {
        match self {
            Status::Ok => "HTTP/1.1 200 OK",
            Status::Created => "HTTP/1.1 201 Created",
            Status::BadRequest => "HTTP/1.1 400 Bad Request",
            Status::ServerError => "HTTP/1.1 500 Internal Server Error",
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::BadRequest => 400,
            Status::ServerError => 500,
        }
    }
}

/// One response: status, the clock value to echo, and the body when
/// one exists (only snapshot reads carry one).
#[derive(Debug)]
pub struct Response {
    pub status: Status,
    pub lamport: u64,
    pub body: Option<String>,
}

impl Response {
    pub fn empty(status: Status, lamport: u64) -> Self {
        Response {
            status,
            lamport,
            body: None,
        }
    }

    /// A 200 carrying the snapshot as a pretty-printed JSON object.
    /// An empty store renders as `{}`, not an error.
    pub fn snapshot(lamport: u64, snapshot: Map<String, Value>) -> Self {
        let body = serde_json::to_string_pretty(&Value::Object(snapshot))
            .unwrap_or_else(|_| String::from("{}"));
        Response {
            status: Status::Ok,
            lamport,
            body: Some(body),
        }
    }

    /// Render to wire bytes. Every response echoes the clock; a body
    /// brings content type and length headers with it.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(self.status.line());
        out.push_str("\r\n");
        let _ = write!(out, "{HEADER_LAMPORT_CLOCK}: {}\r\n", self.lamport);
        match &self.body {
            Some(body) => {
                let _ = write!(out, "{HEADER_CONTENT_TYPE}: application/json\r\n");
                let _ = write!(out, "{HEADER_CONTENT_LENGTH}: {}\r\n", body.len());
                out.push_str("\r\n");
                out.push_str(body);
            }
            None => out.push_str("\r\n"),
        }
        out.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode_to_string(response: &Response) -> String {
        String::from_utf8(response.encode()).unwrap()
    }

    #[test]
    fn empty_response_has_status_clock_and_blank_line() {
        let wire = encode_to_string(&Response::empty(Status::Created, 3));
        assert_eq!(wire, "HTTP/1.1 201 Created\r\nLamport-Clock: 3\r\n\r\n");
    }

    #[test]
    fn snapshot_response_declares_exact_body_length() {
        let mut map = Map::new();
        map.insert("IDS60901".to_string(), json!({"id": "IDS60901"}));
        let wire = encode_to_string(&Response::snapshot(9, map));

        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("Lamport-Clock: 9\r\n"));
        assert!(wire.contains("Content-Type: application/json\r\n"));

        let (head, body) = wire.split_once("\r\n\r\n").unwrap();
        let declared: usize = head
            .lines()
            .find_map(|line| line.strip_prefix("Content-Length: "))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(declared, body.len());

        let parsed: Value = serde_json::from_str(body).unwrap();
        assert_eq!(parsed["IDS60901"]["id"], json!("IDS60901"));
    }

    #[test]
    fn empty_snapshot_is_an_empty_object() {
        let wire = encode_to_string(&Response::snapshot(1, Map::new()));
        let (_, body) = wire.split_once("\r\n\r\n").unwrap();
        assert_eq!(serde_json::from_str::<Value>(body).unwrap(), json!({}));
    }

    #[test]
    fn status_codes_match_lines() {
        assert_eq!(Status::Ok.code(), 200);
        assert_eq!(Status::Created.code(), 201);
        assert_eq!(Status::BadRequest.code(), 400);
        assert_eq!(Status::ServerError.code(), 500);
        assert!(Status::BadRequest.line().contains("400"));
    }
}
