use barehttp::http::error::ResponseError;
use barehttp::http::response::StatusCode;
use barehttp::http::writer::ResponseWriter;
use serde::Serialize;
use tokio::io::AsyncReadExt;

fn writer() -> ResponseWriter {
    ResponseWriter::new(Vec::<u8>::new(), "barehttp")
}

fn split_wire(wire: &[u8]) -> (String, Vec<u8>) {
    let pos = wire
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator");
    (
        String::from_utf8(wire[..pos + 2].to_vec()).unwrap(),
        wire[pos + 4..].to_vec(),
    )
}

fn header_lines(head: &str) -> Vec<&str> {
    head.split("\r\n").skip(1).filter(|l| !l.is_empty()).collect()
}

/// Decodes a chunked body, returning the joined payload and whether the
/// terminating zero-size chunk was seen at the very end.
fn dechunk(mut body: &[u8]) -> (Vec<u8>, bool) {
    let mut out = Vec::new();
    loop {
        let line_end = body.windows(2).position(|w| w == b"\r\n").unwrap();
        let size = usize::from_str_radix(std::str::from_utf8(&body[..line_end]).unwrap(), 16).unwrap();
        body = &body[line_end + 2..];
        if size == 0 {
            return (out, body == b"\r\n");
        }
        out.extend_from_slice(&body[..size]);
        assert_eq!(&body[size..size + 2], b"\r\n");
        body = &body[size + 2..];
    }
}

#[test]
fn test_nothing_sent_before_first_write() {
    let mut res = writer();
    res.set_header("X-Custom", "value");
    res.set_status(201, "Created");

    assert!(res.buffered().is_empty());
    assert!(!res.headers_sent());
    assert_eq!(res.status(), 201);
    assert_eq!(res.header("x-custom").unwrap().to_string(), "value");
}

#[test]
fn test_end_first_uses_content_length() {
    let mut res = writer();
    res.set_status(404, "Not Found");
    res.end("nope").unwrap();

    let wire = res.buffered();
    assert!(wire.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
    assert!(wire.ends_with(b"\r\n\r\nnope"));

    let (head, body) = split_wire(wire);
    let lines = header_lines(&head);
    assert!(lines.contains(&"content-length: 4"));
    assert!(!lines.iter().any(|l| l.starts_with("transfer-encoding")));
    assert_eq!(body, b"nope");
    assert!(res.is_ended());
    assert!(!res.is_chunked());
}

#[test]
fn test_end_without_body_sends_zero_length() {
    let mut res = writer();
    res.end("").unwrap();

    let (head, body) = split_wire(res.buffered());
    assert!(header_lines(&head).contains(&"content-length: 0"));
    assert!(body.is_empty());
}

#[test]
fn test_head_has_server_first_and_date_last() {
    let mut res = writer();
    res.set_header("Content-Type", "text/plain");
    res.end("hi").unwrap();

    let (head, _) = split_wire(res.buffered());
    let lines = header_lines(&head);
    assert_eq!(lines[0], "server: barehttp");
    assert_eq!(lines[1], "content-type: text/plain");

    let date = lines.last().unwrap().strip_prefix("date: ").unwrap();
    // e.g. 2024-01-01T00:00:00.000Z
    assert_eq!(date.len(), 24);
    assert!(date.ends_with('Z'));
    assert_eq!(&date[10..11], "T");
}

#[test]
fn test_write_then_end_is_chunked() {
    let mut res = writer();
    res.write("a").unwrap();
    res.write("bb").unwrap();
    res.end("").unwrap();

    assert!(res.is_chunked());
    let (head, body) = split_wire(res.buffered());
    let lines = header_lines(&head);
    assert!(lines.contains(&"transfer-encoding: chunked"));
    assert!(!lines.iter().any(|l| l.starts_with("content-length")));
    assert_eq!(body, b"1\r\na\r\n2\r\nbb\r\n0\r\n\r\n");
}

#[test]
fn test_chunk_payloads_concatenate_to_all_writes() {
    let parts: Vec<Vec<u8>> = vec![
        b"hello ".to_vec(),
        vec![b'x'; 300],
        "héllo wörld".as_bytes().to_vec(),
        b"\r\n0\r\n\r\n".to_vec(),
    ];

    let mut res = writer();
    for part in &parts {
        res.write(part).unwrap();
    }
    res.end("last").unwrap();

    let (_, body) = split_wire(res.buffered());
    let (payload, terminated) = dechunk(&body);

    let mut expected = parts.concat();
    expected.extend_from_slice(b"last");
    assert_eq!(payload, expected);
    assert!(terminated);
}

#[test]
fn test_explicit_content_length_disables_chunking() {
    let mut res = writer();
    res.set_header("Content-Length", 5usize);
    res.write("he").unwrap();
    res.end("llo").unwrap();

    assert!(!res.is_chunked());
    let (head, body) = split_wire(res.buffered());
    let lines = header_lines(&head);
    assert!(lines.contains(&"content-length: 5"));
    assert!(!lines.iter().any(|l| l.starts_with("transfer-encoding")));
    assert_eq!(body, b"hello");
}

#[test]
fn test_zero_length_write_emits_zero_size_frame() {
    let mut res = writer();
    res.write("").unwrap();

    let (_, body) = split_wire(res.buffered());
    assert_eq!(body, b"0\r\n\r\n");
    assert!(!res.is_ended());
}

#[test]
fn test_header_and_status_frozen_after_send() {
    let mut res = writer();
    res.write("a").unwrap();
    let before = res.buffered().to_vec();

    res.set_header("X-Late", "1");
    res.set_status(500, "Internal Server Error");

    assert_eq!(res.buffered(), &before[..]);
    assert_eq!(res.status(), 200);
    assert!(res.header("x-late").is_none());

    res.end("").unwrap();
    let (head, _) = split_wire(res.buffered());
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(!head.contains("x-late"));
}

#[test]
fn test_json_sets_type_and_length() {
    #[derive(Serialize)]
    struct Greeting {
        message: &'static str,
    }

    let mut res = writer();
    res.json(&Greeting { message: "hi" }).unwrap();

    let (head, body) = split_wire(res.buffered());
    let lines = header_lines(&head);
    assert!(lines.contains(&"content-type: application/json; charset=utf-8"));
    assert!(lines.contains(&"content-length: 16"));
    assert_eq!(body, br#"{"message":"hi"}"#);
    assert!(res.is_ended());
}

#[test]
fn test_json_after_write_fails() {
    let mut res = writer();
    res.write("partial").unwrap();

    let err = res.json(&serde_json::json!({"a": 1})).unwrap_err();
    assert!(matches!(err, ResponseError::HeadersAlreadySent));
    assert_eq!(err.to_string(), "headers already sent");
}

#[test]
fn test_operations_after_end_fail() {
    let mut res = writer();
    res.end("done").unwrap();
    let before = res.buffered().to_vec();

    assert!(matches!(res.write("more"), Err(ResponseError::ResponseEnded)));
    assert!(matches!(res.end("more"), Err(ResponseError::ResponseEnded)));
    assert!(matches!(res.json(&1), Err(ResponseError::HeadersAlreadySent)));
    assert_eq!(res.buffered(), &before[..]);
}

#[test]
fn test_set_status_code_shorthand() {
    let mut res = writer();
    res.set_status_code(StatusCode::NotFound);
    assert_eq!(res.status(), 404);
    assert_eq!(res.status_text(), "Not Found");

    res.set_status_code(StatusCode::InternalServerError);
    res.end("").unwrap();

    assert!(res.buffered().starts_with(b"HTTP/1.1 500 Internal Server Error\r\n"));
}

#[test]
fn test_reset_drops_staged_head() {
    let mut res = writer();
    res.set_status(201, "Created");
    res.set_header("Content-Length", 100usize);
    res.set_header("X-Custom", "value");

    res.reset("barehttp");
    assert_eq!(res.status(), 200);
    assert!(res.header("content-length").is_none());
    assert!(res.header("x-custom").is_none());

    res.end("ok").unwrap();
    let (head, body) = split_wire(res.buffered());
    let lines = header_lines(&head);
    assert_eq!(lines[0], "server: barehttp");
    assert!(lines.contains(&"content-length: 2"));
    assert_eq!(body, b"ok");
}

#[test]
fn test_reset_after_send_is_ignored() {
    let mut res = writer();
    res.set_header("X-Custom", "value");
    res.write("a").unwrap();

    res.reset("other");
    assert!(res.is_chunked());
    assert_eq!(res.header("x-custom").unwrap().to_string(), "value");
}

#[tokio::test]
async fn test_flush_writes_and_closes_transport() {
    let (server, mut client) = tokio::io::duplex(64 * 1024);
    let mut res = ResponseWriter::new(server, "barehttp");

    res.write("streamed").unwrap();
    res.flush().await.unwrap();
    assert!(res.buffered().is_empty());

    res.end("").unwrap();
    res.flush().await.unwrap();
    drop(res);

    let mut wire = Vec::new();
    client.read_to_end(&mut wire).await.unwrap();
    let (_, body) = split_wire(&wire);
    assert_eq!(body, b"8\r\nstreamed\r\n0\r\n\r\n");
}
