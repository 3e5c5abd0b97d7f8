//! Common test utilities and helpers for the upcycle impact tests
//!
//! Nothing here touches the network: the classifier is mocked and HTTP
//! backends are served from a local one-shot listener.

#![allow(dead_code)]

/// Mock classifier for driving the analysis flow without a model
pub mod mock_classifier {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use upcycle_impact::classify::ClassificationResult;
    use upcycle_impact::photo::EncodedImage;
    use upcycle_impact::{Classifier, UpcycleError, UpcycleResult};

    /// What the mock answers.
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Classified(ClassificationResult),
        Unknown,
        Transport,
    }

    pub struct MockClassifier {
        reply: MockReply,
        delay: Option<Duration>,
        calls: AtomicUsize,
        answered: AtomicUsize,
    }

    impl MockClassifier {
        pub fn new(reply: MockReply) -> Self {
            Self {
                reply,
                delay: None,
                calls: AtomicUsize::new(0),
                answered: AtomicUsize::new(0),
            }
        }

        pub fn classified(key: &str) -> Self {
            Self::new(MockReply::Classified(ClassificationResult::new(key)))
        }

        /// Hold every reply for `delay` before answering.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Calls that ran to the end and produced a reply.
        pub fn answered(&self) -> usize {
            self.answered.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Classifier for MockClassifier {
        async fn classify(
            &self,
            _image: &EncodedImage,
            _location: Option<&str>,
        ) -> UpcycleResult<ClassificationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.answered.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                MockReply::Classified(result) => Ok(result.clone()),
                MockReply::Unknown => Err(UpcycleError::classification_unknown("furnitureType")),
                MockReply::Transport => Err(UpcycleError::transport("classify", "connection reset")),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }
    }
}

/// One-shot HTTP server standing in for the model and location APIs
pub mod http {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single response; the handle yields the raw request text.
    pub async fn serve_once(status: u16, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason(status),
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request
        });
        (url, handle)
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = find_header_end(&buf) {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    fn reason(status: u16) -> &'static str {
        match status {
            200 => "OK",
            400 => "Bad Request",
            403 => "Forbidden",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            _ => "Status",
        }
    }
}

/// Synthetic photos
pub mod photos {
    use std::io::Cursor;
    use std::path::{Path, PathBuf};

    use image::{ImageFormat, Rgb, RgbImage};

    /// Two-tone PNG so scaling has something to preserve.
    pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(w, h, |x, _| {
            if x < w / 2 {
                Rgb([150, 100, 50])
            } else {
                Rgb([60, 60, 60])
            }
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    pub fn write_photo(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, png_bytes(w, h)).unwrap();
        path
    }
}
