//! LLM agent modules for document Q&A.
//!
//! This module provides the tool-calling agent that answers questions
//! from the local knowledge base.

pub mod agent_loop;
pub mod tools;

pub use agent_loop::{AgentConfig, DocumentAgent};
