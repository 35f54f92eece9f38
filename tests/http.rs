use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use assetio::{ArchiveIo, ArchiveStream, Error, HttpOptions, HttpSource, ReadStatus};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Behaviour {
    /// Advertise and honour Range requests.
    Ranges,
    /// Leave `Accept-Ranges` out of every response.
    NoRangeSupport,
    /// Advertise ranges, then answer every GET with the whole body and 200.
    IgnoreRange,
}

/// Serve `data` at every path on a background thread, one request per connection.
fn start_server(data: Vec<u8>, behaviour: Behaviour) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test server");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().expect("local addr");
    let data = Arc::new(data);

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("server runtime");
        runtime.block_on(async move {
            let listener = TcpListener::from_std(listener).expect("tokio listener");
            while let Ok((stream, _)) = listener.accept().await {
                let data = data.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, &data, behaviour).await;
                });
            }
        });
    });

    format!("http://{addr}/assets")
}

async fn handle_connection(
    mut stream: TcpStream,
    data: &[u8],
    behaviour: Behaviour,
) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        request.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&request);
    let is_head = request.starts_with("HEAD ");
    let range = request.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.eq_ignore_ascii_case("range")
            .then(|| parse_range(value.trim()))
            .flatten()
    });

    let total = data.len();
    let (status, body, content_range) = match range {
        Some((start, end)) if behaviour != Behaviour::IgnoreRange && start < total => {
            let end = end.min(total - 1);
            (
                "206 Partial Content",
                &data[start..=end],
                format!("Content-Range: bytes {start}-{end}/{total}\r\n"),
            )
        }
        _ => ("200 OK", data, String::new()),
    };
    let accept_ranges = match behaviour {
        Behaviour::NoRangeSupport => "",
        _ => "Accept-Ranges: bytes\r\n",
    };

    let header = format!(
        "HTTP/1.1 {status}\r\n{accept_ranges}{content_range}Content-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(header.as_bytes()).await?;
    if !is_head {
        stream.write_all(body).await?;
    }
    stream.shutdown().await
}

fn parse_range(value: &str) -> Option<(usize, usize)> {
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

fn source(base_url: String) -> Arc<HttpSource> {
    let options = HttpOptions {
        timeout: Duration::from_secs(5),
        max_retry: 2,
    };
    Arc::new(HttpSource::new(base_url, &options).expect("http source"))
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn range_reads_through_the_adapter() {
    let data = payload(1000);
    let source = source(start_server(data.clone(), Behaviour::Ranges));

    let mut stream = ArchiveStream::open(source, "game.pak").unwrap();
    assert_eq!(stream.length(), 1000);

    let mut buf = [0u8; 100];
    assert_eq!(stream.read(&mut buf).unwrap(), ReadStatus::Read(100));
    assert_eq!(&buf[..], &data[..100]);
    assert_eq!(stream.tell(), 100);

    stream.seek(990).unwrap();
    assert_eq!(stream.read(&mut buf).unwrap(), ReadStatus::Read(10));
    assert_eq!(&buf[..10], &data[990..]);
    assert_eq!(stream.tell(), 1000);
    assert_eq!(stream.read(&mut buf).unwrap(), ReadStatus::Eof);

    let mut dup = stream.duplicate().unwrap();
    assert_eq!(dup.tell(), 1000);
    dup.seek(500).unwrap();
    assert_eq!(dup.read(&mut buf[..4]).unwrap(), ReadStatus::Read(4));
    assert_eq!(&buf[..4], &data[500..504]);
    assert_eq!(stream.tell(), 1000);
}

#[test]
fn server_without_range_support_fails_to_open() {
    let source = source(start_server(payload(64), Behaviour::NoRangeSupport));

    let err = ArchiveStream::open(source, "game.pak").err().unwrap();
    assert!(matches!(err, Error::Open { ref name, .. } if name == "game.pak"));
}

#[test]
fn full_body_reply_is_an_io_error_not_eof() {
    let source = source(start_server(payload(64), Behaviour::IgnoreRange));

    let mut stream = ArchiveStream::open(source, "game.pak").unwrap();
    assert_eq!(stream.length(), 64);

    let err = stream.read(&mut [0u8; 16]).unwrap_err();
    assert!(matches!(err, Error::Io { ref message, .. } if message.contains("200")));
    assert_eq!(stream.tell(), 0);
}
