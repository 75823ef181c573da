// klam-core - Runtime options
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Configuration supplied when a runtime is constructed.
//!
//! Every option is optional. Missing text options read as `"Unknown"`,
//! missing streams are bound to streams that fail with an unsupported
//! capability error, and a missing clock falls back to system time.
//!
//! ```
//! use klam_core::Options;
//!
//! let options = Options::new()
//!     .with_implementation("test harness")
//!     .with_os("Linux")
//!     .with_suspend(true);
//! assert_eq!(options.implementation(), "test harness");
//! assert_eq!(options.release(), "Unknown");
//! ```

use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use klam_reader::KlamStream;

use crate::error::Result;

/// Opens the stream at a path.
pub type OpenFn = dyn Fn(&str) -> Result<KlamStream>;

/// Milliseconds since the Unix epoch.
pub type ClockFn = dyn Fn() -> f64;

const UNKNOWN: &str = "Unknown";

#[derive(Clone, Default)]
pub struct Options {
    implementation: Option<String>,
    release: Option<String>,
    os: Option<String>,
    port: Option<String>,
    porters: Option<String>,
    stinput: Option<KlamStream>,
    stoutput: Option<KlamStream>,
    sterror: Option<KlamStream>,
    open_read: Option<Rc<OpenFn>>,
    open_write: Option<Rc<OpenFn>>,
    clock: Option<Rc<ClockFn>>,
    suspend: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_implementation(mut self, name: impl Into<String>) -> Self {
        self.implementation = Some(name.into());
        self
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn with_porters(mut self, porters: impl Into<String>) -> Self {
        self.porters = Some(porters.into());
        self
    }

    pub fn with_stinput(mut self, stream: KlamStream) -> Self {
        self.stinput = Some(stream);
        self
    }

    pub fn with_stoutput(mut self, stream: KlamStream) -> Self {
        self.stoutput = Some(stream);
        self
    }

    pub fn with_sterror(mut self, stream: KlamStream) -> Self {
        self.sterror = Some(stream);
        self
    }

    pub fn with_open_read(mut self, open: impl Fn(&str) -> Result<KlamStream> + 'static) -> Self {
        self.open_read = Some(Rc::new(open));
        self
    }

    pub fn with_open_write(mut self, open: impl Fn(&str) -> Result<KlamStream> + 'static) -> Self {
        self.open_write = Some(Rc::new(open));
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> f64 + 'static) -> Self {
        self.clock = Some(Rc::new(clock));
        self
    }

    /// Select the suspension-aware driving mode.
    pub fn with_suspend(mut self, suspend: bool) -> Self {
        self.suspend = suspend;
        self
    }

    pub fn implementation(&self) -> &str {
        self.implementation.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn release(&self) -> &str {
        self.release.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn os(&self) -> &str {
        self.os.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn port(&self) -> &str {
        self.port.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn porters(&self) -> &str {
        self.porters.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn stinput(&self) -> KlamStream {
        self.stinput
            .clone()
            .unwrap_or_else(|| KlamStream::unsupported("stinput", "standard input"))
    }

    pub fn stoutput(&self) -> KlamStream {
        self.stoutput
            .clone()
            .unwrap_or_else(|| KlamStream::unsupported("stoutput", "standard output"))
    }

    pub fn sterror(&self) -> KlamStream {
        self.sterror
            .clone()
            .unwrap_or_else(|| KlamStream::unsupported("sterror", "standard error"))
    }

    pub fn open_read(&self) -> Option<&Rc<OpenFn>> {
        self.open_read.as_ref()
    }

    pub fn open_write(&self) -> Option<&Rc<OpenFn>> {
        self.open_write.as_ref()
    }

    /// Current time in milliseconds since the Unix epoch.
    pub fn now_millis(&self) -> f64 {
        match &self.clock {
            Some(clock) => clock(),
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as f64)
                .unwrap_or(0.0),
        }
    }

    pub fn suspend(&self) -> bool {
        self.suspend
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("implementation", &self.implementation())
            .field("release", &self.release())
            .field("os", &self.os())
            .field("port", &self.port())
            .field("porters", &self.porters())
            .field("open_read", &self.open_read.is_some())
            .field("open_write", &self.open_write.is_some())
            .field("clock", &self.clock.is_some())
            .field("suspend", &self.suspend)
            .finish()
    }
}
