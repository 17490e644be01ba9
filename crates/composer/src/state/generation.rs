//! AI scene generation: prompt in, batch of objects out.
//!
//! Requests run on a background tokio runtime so the editor stays usable while
//! they are pending. Finished requests are picked up by [`GenerationState::poll_results`]
//! and committed as a single snapshot on top of whatever is current by then.

use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::{GenerateRequest, GenerateResponse, ObjectId, SceneDescription};

use super::scene::SceneState;

/// Why a generation request produced nothing
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Network/connection failure
    Transport(String),
    /// Service answered with a non-success status
    Status(u16),
    /// Response could not be parsed or contained invalid objects
    Malformed(String),
    /// Background runtime could not be started
    Runtime(String),
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::Transport(msg) => write!(f, "Connection error: {}", msg),
            GenerationError::Status(code) => write!(f, "Generation service returned HTTP {}", code),
            GenerationError::Malformed(msg) => write!(f, "Malformed response: {}", msg),
            GenerationError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for GenerationError {}

pub type GenerationResult = Result<GenerateResponse, GenerationError>;
pub type GenerationFuture = Pin<Box<dyn Future<Output = GenerationResult> + Send + 'static>>;

/// Something that turns a prompt into objects
pub trait SceneGenerator: Send + Sync {
    fn generate(&self, request: GenerateRequest) -> GenerationFuture;
}

/// Generator backed by the HTTP generation service
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGenerator {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SceneGenerator for HttpGenerator {
    fn generate(&self, request: GenerateRequest) -> GenerationFuture {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        Box::pin(async move {
            let response = client
                .post(&endpoint)
                .json(&request)
                .send()
                .await
                .map_err(|e| GenerationError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(GenerationError::Status(status.as_u16()));
            }

            response
                .json::<GenerateResponse>()
                .await
                .map_err(|e| GenerationError::Malformed(e.to_string()))
        })
    }
}

/// Role of a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub is_error: bool,
}

struct Finished {
    prompt: String,
    result: GenerationResult,
}

/// Prompt log and in-flight generation requests
pub struct GenerationState {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub last_failed_input: Option<String>,
    generator: Arc<dyn SceneGenerator>,
    runtime: Option<tokio::runtime::Runtime>,
    pending: usize,
    tx: mpsc::Sender<Finished>,
    rx: mpsc::Receiver<Finished>,
}

impl GenerationState {
    pub fn new(generator: Arc<dyn SceneGenerator>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            messages: Vec::new(),
            input: String::new(),
            last_failed_input: None,
            generator,
            runtime: None,
            pending: 0,
            tx,
            rx,
        }
    }

    /// Swap the backing generator (e.g. after the server URL changed)
    pub fn set_generator(&mut self, generator: Arc<dyn SceneGenerator>) {
        self.generator = generator;
    }

    /// Whether any request is still in flight
    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Send the current input as a prompt. Returns false if nothing was sent.
    pub fn send_message(&mut self, scene: &SceneDescription) -> bool {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return false;
        }
        self.input.clear();
        self.send_prompt(text, scene)
    }

    /// Re-send the last prompt that failed
    pub fn retry(&mut self, scene: &SceneDescription) -> bool {
        match self.last_failed_input.take() {
            Some(prompt) => self.send_prompt(prompt, scene),
            None => false,
        }
    }

    /// Start a generation request without blocking
    pub fn send_prompt(&mut self, prompt: String, scene: &SceneDescription) -> bool {
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            text: prompt.clone(),
            is_error: false,
        });

        if self.runtime.is_none() {
            match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("scene-generation")
                .enable_all()
                .build()
            {
                Ok(rt) => self.runtime = Some(rt),
                Err(e) => {
                    self.fail(prompt, GenerationError::Runtime(e.to_string()));
                    return false;
                }
            }
        }
        let Some(runtime) = &self.runtime else {
            return false;
        };

        let request = GenerateRequest {
            prompt: prompt.clone(),
            scene: scene.clone(),
        };
        let future = self.generator.generate(request);
        let tx = self.tx.clone();
        runtime.spawn(async move {
            let result = future.await;
            // Receiver gone means the editor shut down
            let _ = tx.send(Finished { prompt, result });
        });

        self.pending += 1;
        tracing::info!(pending = self.pending, "generation request sent");
        true
    }

    /// Commit every finished request. Returns the IDs of added objects, if any.
    pub fn poll_results(&mut self, scene: &mut SceneState) -> Option<Vec<ObjectId>> {
        let mut added = Vec::new();
        while let Ok(finished) = self.rx.try_recv() {
            added.extend(self.finish(finished, scene));
        }
        (!added.is_empty()).then_some(added)
    }

    /// Block until all pending requests have finished or `timeout` elapses,
    /// committing results as they arrive.
    pub fn wait_for_results(&mut self, scene: &mut SceneState, timeout: Duration) -> Vec<ObjectId> {
        let deadline = Instant::now() + timeout;
        let mut added = Vec::new();
        while self.pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(finished) => added.extend(self.finish(finished, scene)),
                Err(_) => break,
            }
        }
        added
    }

    fn finish(&mut self, finished: Finished, scene: &mut SceneState) -> Vec<ObjectId> {
        self.pending = self.pending.saturating_sub(1);

        let response = match finished.result {
            Ok(response) => response,
            Err(e) => {
                self.fail(finished.prompt, e);
                return Vec::new();
            }
        };

        if let Some(bad) = response.objects.iter().find(|o| !o.is_well_formed()) {
            let err = GenerationError::Malformed(format!("invalid object '{}'", bad.name));
            self.fail(finished.prompt, err);
            return Vec::new();
        }

        let ids = scene.apply_generated(response.objects);
        let text = if response.text.is_empty() {
            format!("Added {} objects", ids.len())
        } else {
            response.text
        };
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            text,
            is_error: false,
        });
        ids
    }

    fn fail(&mut self, prompt: String, err: GenerationError) {
        tracing::warn!("Scene generation failed: {err}");
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            text: err.to_string(),
            is_error: true,
        });
        self.last_failed_input = Some(prompt);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.input.clear();
        self.last_failed_input = None;
    }
}
