//! Sending requests: the [`Transport`] seam, the HTTP implementation with a
//! fixed retry budget, and a decorator that dumps traffic to disk.

use std::{
    fmt::Write as _,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use indexmap::IndexMap;
use tracing::{debug, warn};
use url::Url;

use crate::{Error, Result, security::mask_tokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: IndexMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: IndexMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response.
///
/// Non-2xx statuses are responses, not errors; interpreting them is the
/// caller's job.
pub trait Transport {
    fn send(&self, request: &Request) -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &Request) -> Result<Response> {
        (**self).send(request)
    }
}

/// Blocking HTTP transport with a small, fixed retry budget.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpTransport {
    pub const MAX_RETRIES: u32 = 2;

    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| {
                Box::new(Error::Http {
                    url: String::new(),
                    attempts: 0,
                    source,
                })
            })?;
        Ok(Self {
            client,
            max_retries: Self::MAX_RETRIES,
            retry_delay: Duration::from_millis(500),
        })
    }

    fn send_once(&self, request: &Request) -> std::result::Result<Response, reqwest::Error> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(Response { status, body })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let mut attempt = 1;
        loop {
            debug!(method = request.method.as_str(), url = %request.url, attempt, "sending request");
            let result = self.send_once(request);
            let retry = match &result {
                Ok(response) => response.status >= 500 || response.status == 429,
                Err(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            };
            if !retry || attempt > self.max_retries {
                return result.map_err(|source| {
                    Box::new(Error::Http {
                        url: request.url.to_string(),
                        attempts: attempt,
                        source,
                    })
                });
            }
            match &result {
                Ok(response) => warn!(status = response.status, attempt, "retrying request"),
                Err(e) => warn!(error = %e, attempt, "retrying request"),
            }
            thread::sleep(self.retry_delay);
            attempt += 1;
        }
    }
}

/// Writes every request and response to numbered files in a directory.
///
/// User tokens are masked before anything touches the disk.
pub struct DumpTransport<T> {
    inner: T,
    dir: PathBuf,
    counter: AtomicUsize,
}

impl<T: Transport> DumpTransport<T> {
    pub fn new(inner: T, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Box::new(Error::Write {
                path: dir.clone(),
                source: e,
            })
        })?;
        Ok(Self {
            inner,
            dir,
            counter: AtomicUsize::new(0),
        })
    }

    fn write(&self, name: String, content: &str) -> Result<()> {
        let path = self.dir.join(name);
        std::fs::write(&path, mask_tokens(content)).map_err(|e| {
            Box::new(Error::Write {
                path: path.clone(),
                source: e,
            })
        })
    }
}

impl<T: Transport> Transport for DumpTransport<T> {
    fn send(&self, request: &Request) -> Result<Response> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;

        let mut dump = format!("{} {}\n", request.method.as_str(), request.url);
        for (name, value) in &request.headers {
            let _ = writeln!(dump, "{name}: {value}");
        }
        if let Some(body) = &request.body {
            dump.push('\n');
            dump.push_str(&String::from_utf8_lossy(body));
            dump.push('\n');
        }
        self.write(format!("{n:04}-request.txt"), &dump)?;

        let response = self.inner.send(request)?;
        let dump = format!(
            "HTTP {}\n\n{}\n",
            response.status,
            String::from_utf8_lossy(&response.body)
        );
        self.write(format!("{n:04}-response.txt"), &dump)?;
        Ok(response)
    }
}
