use std::sync::Arc;

use crate::{
    models::Movie,
    services::{
        grounding::{detail_expansion_prompt, PersonaContext, PromptTemplate},
        relay::{ChatRelay, RelayError},
        sanitizer::Sanitizer,
    },
};

pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect to backend.";
pub const CHAT_FAILED_MESSAGE: &str = "Error, Please try again later";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Detail expansion shown under the overview
    Description,
    /// Answer to a free-text question
    Answer,
}

/// Prompt ready to be sent, detached from the session that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPrompt {
    pub movie_id: u64,
    pub kind: PromptKind,
    pub prompt: String,
}

/// Render-ready reply
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Sanitized model markup
    Html(String),
    /// Short plain-text failure notice
    Notice(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroundedReply {
    pub movie_id: u64,
    pub kind: PromptKind,
    pub reply: Reply,
}

/// State of the movie detail view: the one selected movie, its persona
/// prefix and the latest replies
#[derive(Debug, Default)]
pub struct DetailSession {
    selected: Option<Movie>,
    persona: Option<PersonaContext>,
    description: Option<Reply>,
    answer: Option<Reply>,
}

impl DetailSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `movie` the selected one, replacing the persona and dropping
    /// replies that belonged to the previous selection
    pub fn select(&mut self, movie: Movie, template: &PromptTemplate) {
        self.persona = Some(PersonaContext::build(&movie, template));
        self.selected = Some(movie);
        self.description = None;
        self.answer = None;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<&Movie> {
        self.selected.as_ref()
    }

    pub fn persona(&self) -> Option<&PersonaContext> {
        self.persona.as_ref()
    }

    pub fn description(&self) -> Option<&Reply> {
        self.description.as_ref()
    }

    pub fn answer(&self) -> Option<&Reply> {
        self.answer.as_ref()
    }

    /// Stores `reply` if it belongs to the selected movie; returns whether
    /// it was kept
    pub fn accept(&mut self, reply: GroundedReply) -> bool {
        let current = self.selected.as_ref().map(|movie| movie.id);
        if current != Some(reply.movie_id) {
            tracing::debug!(
                movie_id = reply.movie_id,
                selected = ?current,
                "Discarding reply for a movie that is no longer selected"
            );
            return false;
        }

        match reply.kind {
            PromptKind::Description => self.description = Some(reply.reply),
            PromptKind::Answer => self.answer = Some(reply.reply),
        }
        true
    }
}

/// Grounded chat over the relay
///
/// Replies come back tagged with the movie they were asked about, so one
/// that lands after the user switched movies is discarded by
/// `DetailSession::accept`.
pub struct MovieAssistant {
    relay: Arc<dyn ChatRelay>,
    sanitizer: Sanitizer,
    template: PromptTemplate,
}

impl MovieAssistant {
    pub fn new(relay: Arc<dyn ChatRelay>, sanitizer: Sanitizer, template: PromptTemplate) -> Self {
        Self {
            relay,
            sanitizer,
            template,
        }
    }

    /// Opens the detail view for `movie` and returns its expansion prompt
    pub fn open(&self, session: &mut DetailSession, movie: Movie) -> PendingPrompt {
        let pending = PendingPrompt {
            movie_id: movie.id,
            kind: PromptKind::Description,
            prompt: detail_expansion_prompt(&movie, &self.template),
        };
        session.select(movie, &self.template);
        pending
    }

    /// Expansion prompt for the selected movie, or `None` when nothing is selected
    pub fn describe(&self, session: &DetailSession) -> Option<PendingPrompt> {
        let movie = session.selected()?;
        Some(PendingPrompt {
            movie_id: movie.id,
            kind: PromptKind::Description,
            prompt: detail_expansion_prompt(movie, &self.template),
        })
    }

    /// Persona-prefixed prompt for `question`; `None` without a selection or
    /// for a blank question
    pub fn ask(&self, session: &DetailSession, question: &str) -> Option<PendingPrompt> {
        let persona = session.persona()?;
        if question.trim().is_empty() {
            return None;
        }
        Some(PendingPrompt {
            movie_id: persona.movie_id(),
            kind: PromptKind::Answer,
            prompt: persona.compose(question),
        })
    }

    /// Sends one prompt and turns the outcome into something safe to render
    pub async fn submit(&self, pending: PendingPrompt) -> GroundedReply {
        let reply = match self.relay.send(&pending.prompt).await {
            Ok(text) => Reply::Html(self.sanitizer.clean(&text)),
            Err(e) => Reply::Notice(failure_notice(pending.kind, &e)),
        };

        GroundedReply {
            movie_id: pending.movie_id,
            kind: pending.kind,
            reply,
        }
    }
}

fn failure_notice(kind: PromptKind, err: &RelayError) -> String {
    match (kind, err) {
        (PromptKind::Description, RelayError::Rejected { message, .. }) => {
            format!("Error from API: {}", message)
        }
        (PromptKind::Description, RelayError::Unreachable) => CONNECT_FAILED_MESSAGE.to_string(),
        (PromptKind::Answer, _) => CHAT_FAILED_MESSAGE.to_string(),
    }
}
