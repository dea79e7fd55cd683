//! In-memory transport for operation tests.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use qbcli_client::{Client, Profile, Request, Response, Result, Transport};

#[derive(Clone, Default)]
pub struct FakeTransport {
    sent: Arc<Mutex<Vec<Request>>>,
    replies: Arc<Mutex<VecDeque<Response>>>,
}

impl FakeTransport {
    pub fn reply(&self, body: serde_json::Value) -> &Self {
        self.replies.lock().push_back(Response {
            status: 200,
            body: body.to_string().into_bytes(),
        });
        self
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.sent
            .lock()
            .iter()
            .map(|r| serde_json::from_slice(r.body.as_deref().unwrap_or(b"null")).unwrap())
            .collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.sent.lock().iter().map(|r| r.url.to_string()).collect()
    }

    pub fn client(&self) -> Client {
        let profile = Profile {
            realm_hostname: Some("example.quickbase.com".into()),
            user_token: Some("b4ab2c_cwv3_d6e5f7g8h9j0k1m2n3p4q5r6s7t8".into()),
            ..Profile::default()
        };
        Client::new(&profile, self.clone()).unwrap()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        self.sent.lock().push(request.clone());
        Ok(self.replies.lock().pop_front().unwrap_or(Response {
            status: 500,
            body: b"{\"message\":\"no reply queued\"}".to_vec(),
        }))
    }
}
