//! In-memory session tracking.
//!
//! A session groups the question/answer exchanges of one process run,
//! whether one-shot or interactive. Nothing is persisted; the session
//! lives only as long as the process.

use chrono::{DateTime, Utc};

/// A single question/answer exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// An in-memory conversation session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session identifier, derived from the creation time.
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub exchanges: Vec<Exchange>,
}

impl Session {
    /// Start a new session.
    pub fn new() -> Self {
        let created_at = Utc::now();
        Self {
            id: format!("session-{}", created_at.format("%Y%m%d%H%M%S")),
            created_at,
            exchanges: Vec::new(),
        }
    }

    /// Record a completed exchange.
    pub fn record(&mut self, question: String, answer: String) {
        self.exchanges.push(Exchange {
            question,
            answer,
            asked_at: Utc::now(),
        });
    }

    /// Number of questions asked so far.
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_records_exchanges() {
        let mut session = Session::new();
        assert!(session.is_empty());

        session.record("What is in the notes?".to_string(), "Not much.".to_string());
        session.record("Anything else?".to_string(), "No.".to_string());

        assert_eq!(session.len(), 2);
        assert_eq!(session.exchanges[0].question, "What is in the notes?");
        assert_eq!(session.exchanges[1].answer, "No.");
    }

    #[test]
    fn test_session_id_prefix() {
        let session = Session::new();
        assert!(session.id.starts_with("session-"));
    }
}
