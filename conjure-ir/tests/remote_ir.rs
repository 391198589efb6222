use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use conjure_core::IrSource;
use conjure_ir::{IrError, IrProvider};

/// Serves one request with the given status line and body.
fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line.trim_end().is_empty() {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
    });
    format!("http://{addr}/api.conjure.json")
}

#[test]
fn downloads_remote_ir() {
    let url = serve_once("200 OK", r#"{"version":1,"types":[]}"#);
    let bytes = IrProvider::default()
        .ir_bytes(&IrSource::Remote { url })
        .expect("remote ir");
    assert_eq!(bytes, br#"{"version":1,"types":[]}"#);
}

#[test]
fn non_success_status_is_an_error() {
    let url = serve_once("404 Not Found", "missing");
    let err = IrProvider::default()
        .ir_bytes(&IrSource::Remote { url: url.clone() })
        .unwrap_err();
    assert!(matches!(err, IrError::Http { .. }), "{err}");
    assert!(err.to_string().contains(&url));
}

#[test]
fn remote_non_object_is_invalid_ir() {
    let url = serve_once("200 OK", "[1,2,3]");
    let err = IrProvider::default()
        .ir_bytes(&IrSource::Remote { url })
        .unwrap_err();
    assert!(matches!(err, IrError::InvalidIr { .. }), "{err}");
}
