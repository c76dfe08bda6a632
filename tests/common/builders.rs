//! Test builders: isolated stores, request payloads and live host sessions.
//!
//! These are designed for readability in test assertions, not for production
//! use. They panic on failure rather than returning `Result`.

use std::thread::JoinHandle;

use ff_core::config::Config;
use ff_core::Store;
use ff_host::{read_frame, write_frame, FrameError, Handler, HostLimits, Response, ServeSummary};
use serde_json::{Map, Value};
use tempfile::TempDir;

use super::pipe::{pipe, PipeReader, PipeWriter, PIPE_TIMEOUT};

// ---------------------------------------------------------------------------
// TestStore
// ---------------------------------------------------------------------------

/// A store at `<tmp>/.feedbackflow`, with raw host paths resolved against
/// `<tmp>` so the extension's default path lands in the store's log. The
/// directory lives as long as the value.
pub struct TestStore {
    pub dir: TempDir,
    pub config: Config,
    pub store: Store,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = Config::isolated(&dir.path().join(".feedbackflow"));
        config.host.base_dir = dir.path().display().to_string();
        let store = Store::from_config(&config.store);
        Self { dir, config, store }
    }

    /// Store pre-populated with one appended entry per message.
    pub fn with_entries(messages: &[&str]) -> Self {
        let ts = Self::new();
        for m in messages {
            ts.store.append(m, None, None).expect("append");
        }
        ts
    }

    pub fn handler(&self) -> Handler {
        Handler::from_config(&self.config)
    }

    pub fn log_bytes(&self) -> Vec<u8> {
        std::fs::read(self.store.log_path()).expect("read log")
    }

    pub fn meta_bytes(&self) -> Vec<u8> {
        std::fs::read(self.store.meta_path()).expect("read meta")
    }

    /// Overwrite the metadata file with arbitrary bytes.
    pub fn write_meta_raw(&self, bytes: &[u8]) {
        std::fs::create_dir_all(self.store.dir()).expect("mkdir");
        std::fs::write(self.store.meta_path(), bytes).expect("write meta");
    }

    /// Append bytes to the log without going through the store.
    pub fn append_log_raw(&self, bytes: &[u8]) {
        use std::io::Write;
        std::fs::create_dir_all(self.store.dir()).expect("mkdir");
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.store.log_path())
            .expect("open log")
            .write_all(bytes)
            .expect("append log");
    }
}

// ---------------------------------------------------------------------------
// RequestBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for request payloads.
///
/// ```rust
/// let payload = request("add").field("message", "hi").field("source", "https://a.test").build();
/// ```
pub struct RequestBuilder {
    fields: Map<String, Value>,
}

pub fn request(action: &str) -> RequestBuilder {
    let mut fields = Map::new();
    fields.insert("action".to_string(), Value::from(action));
    RequestBuilder { fields }
}

impl RequestBuilder {
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn build(self) -> Vec<u8> {
        serde_json::to_vec(&Value::Object(self.fields)).expect("encode request")
    }
}

// ---------------------------------------------------------------------------
// HostSession
// ---------------------------------------------------------------------------

/// A host serve loop running on its own thread, connected to the test
/// through two in-memory pipes, as the browser would be.
pub struct HostSession {
    to_host: PipeWriter,
    from_host: PipeReader,
    worker: JoinHandle<Result<ServeSummary, FrameError>>,
}

impl HostSession {
    pub fn start(handler: Handler) -> Self {
        Self::start_with_limits(handler, HostLimits::default())
    }

    pub fn start_with_limits(handler: Handler, limits: HostLimits) -> Self {
        let (to_host, host_stdin) = pipe();
        let (host_stdout, from_host) = pipe();
        let worker = std::thread::spawn(move || ff_host::serve(host_stdin, host_stdout, &handler, limits));
        Self {
            to_host,
            from_host: from_host.with_timeout(PIPE_TIMEOUT),
            worker,
        }
    }

    /// Send raw bytes without framing them.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        use std::io::Write;
        self.to_host.write_all(bytes).expect("write raw");
        self.to_host.flush().expect("flush raw");
    }

    /// Send one payload and wait for the response frame.
    pub fn call(&mut self, payload: &[u8]) -> Response {
        write_frame(&mut self.to_host, payload).expect("send frame");
        let frame = read_frame(&mut self.from_host, u32::MAX)
            .expect("response frame")
            .expect("host closed the channel");
        serde_json::from_slice(&frame).expect("response is JSON")
    }

    /// Close the browser side and collect the loop's result.
    pub fn close(self) -> Result<ServeSummary, FrameError> {
        drop(self.to_host);
        self.worker.join().expect("host thread panicked")
    }
}
