//! In-memory collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::auth::ShakeCue;
use crate::collaborators::{Authenticator, FeedbackCues, SetupStatus, ViewRouter};
use crate::navigation::{Destination, TransitionMode};

#[derive(Debug, Clone)]
pub struct RouterCall {
    pub destination: Destination,
    pub mode: TransitionMode,
    pub started: Instant,
    pub finished: Instant,
    pub succeeded: bool,
}

/// Router that records every call and takes `latency` to "animate".
pub struct RecordingRouter {
    latency: Duration,
    calls: Mutex<Vec<RouterCall>>,
}

impl RecordingRouter {
    /// Destination that makes the router return an error.
    pub const FAILING: &'static str = "broken";
    /// Destination that makes the router panic.
    pub const PANICKING: &'static str = "explode";

    pub fn new(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RouterCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Destinations whose transition succeeded, in execution order.
    pub fn completed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.succeeded)
            .map(|c| c.destination.to_string())
            .collect()
    }

    fn record(&self, destination: &Destination, mode: TransitionMode, started: Instant, ok: bool) {
        self.calls.lock().unwrap().push(RouterCall {
            destination: destination.clone(),
            mode,
            started,
            finished: Instant::now(),
            succeeded: ok,
        });
    }
}

#[async_trait]
impl ViewRouter for RecordingRouter {
    async fn navigate_to(
        &self,
        destination: &Destination,
        mode: TransitionMode,
    ) -> anyhow::Result<()> {
        let started = Instant::now();
        tokio::time::sleep(self.latency).await;

        match destination.as_str() {
            Self::FAILING => {
                self.record(destination, mode, started, false);
                anyhow::bail!("route {} is not mounted", destination)
            }
            Self::PANICKING => {
                self.record(destination, mode, started, false);
                panic!("router blew up on {}", destination)
            }
            _ => {
                self.record(destination, mode, started, true);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum AuthReply {
    Accept,
    Reject,
    Fail,
    Panic,
}

/// Authenticator driven either by a script of replies or by a known PIN.
pub struct ScriptedAuthenticator {
    pin: Option<String>,
    script: Mutex<VecDeque<AuthReply>>,
    latency: Duration,
    secrets: Mutex<Vec<String>>,
    session: Option<watch::Sender<bool>>,
}

impl ScriptedAuthenticator {
    /// Accepts exactly `pin`.
    pub fn with_pin(pin: &str) -> Arc<Self> {
        Self::build(Some(pin.to_string()), Vec::new(), Duration::ZERO, None)
    }

    /// Replays `replies` in order; rejects once exhausted.
    pub fn scripted(replies: Vec<AuthReply>) -> Arc<Self> {
        Self::build(None, replies, Duration::ZERO, None)
    }

    /// Accepts `pin` after `latency` and flips `session` to true on success.
    pub fn with_session(pin: &str, latency: Duration, session: watch::Sender<bool>) -> Arc<Self> {
        Self::build(Some(pin.to_string()), Vec::new(), latency, Some(session))
    }

    pub fn slow(pin: &str, latency: Duration) -> Arc<Self> {
        Self::build(Some(pin.to_string()), Vec::new(), latency, None)
    }

    fn build(
        pin: Option<String>,
        replies: Vec<AuthReply>,
        latency: Duration,
        session: Option<watch::Sender<bool>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            pin,
            script: Mutex::new(replies.into()),
            latency,
            secrets: Mutex::new(Vec::new()),
            session,
        })
    }

    /// Every secret passed to `authenticate`, in call order.
    pub fn secrets(&self) -> Vec<String> {
        self.secrets.lock().unwrap().clone()
    }
}

#[async_trait]
impl Authenticator for ScriptedAuthenticator {
    async fn authenticate(&self, secret: &str) -> anyhow::Result<bool> {
        self.secrets.lock().unwrap().push(secret.to_string());
        tokio::time::sleep(self.latency).await;

        let reply = match &self.pin {
            Some(pin) if pin == secret => AuthReply::Accept,
            Some(_) => AuthReply::Reject,
            None => self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(AuthReply::Reject),
        };

        match reply {
            AuthReply::Accept => {
                if let Some(session) = &self.session {
                    session.send_replace(true);
                }
                Ok(true)
            }
            AuthReply::Reject => Ok(false),
            AuthReply::Fail => anyhow::bail!("keystore unavailable"),
            AuthReply::Panic => panic!("authenticator crashed"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SetupReply {
    Complete,
    Incomplete,
    Fail,
    Panic,
}

pub struct ScriptedSetup {
    reply: Mutex<SetupReply>,
    calls: AtomicUsize,
}

impl ScriptedSetup {
    pub fn new(reply: SetupReply) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, reply: SetupReply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SetupStatus for ScriptedSetup {
    async fn is_setup_complete(&self) -> anyhow::Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = *self.reply.lock().unwrap();
        match reply {
            SetupReply::Complete => Ok(true),
            SetupReply::Incomplete => Ok(false),
            SetupReply::Fail => anyhow::bail!("preferences store locked"),
            SetupReply::Panic => panic!("setup check crashed"),
        }
    }
}

#[derive(Default)]
pub struct CountingFeedback {
    haptics: AtomicUsize,
    shakes: Mutex<Vec<ShakeCue>>,
}

impl CountingFeedback {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn haptics(&self) -> usize {
        self.haptics.load(Ordering::SeqCst)
    }

    pub fn shakes(&self) -> Vec<ShakeCue> {
        self.shakes.lock().unwrap().clone()
    }
}

impl FeedbackCues for CountingFeedback {
    fn haptic_error(&self) {
        self.haptics.fetch_add(1, Ordering::SeqCst);
    }

    fn shake(&self, cue: &ShakeCue) {
        self.shakes.lock().unwrap().push(cue.clone());
    }
}
