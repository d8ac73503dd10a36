//! Personas for the tiny-sola voice assistant.
//!
//! Holds the role/skill catalog and turns a role, an optional skill, the
//! latest user text and recent conversation history into a single prompt for
//! the generation model. Everything here is pure data shaping: no network,
//! no subprocesses.
//!
//! # Core types
//!
//! - [`Catalog`] - immutable registry of [`RoleDefinition`]s and [`SkillDefinition`]s
//! - [`ConversationMessage`] - one caller-supplied history turn
//!
//! # Prompt building
//!
//! - [`build_conversation_prompt`] - open-ended in-character reply
//! - [`build_skill_prompt`] - skill invocation, gated on required input

pub mod builtin;
pub mod catalog;
pub mod error;
pub mod history;
pub mod prompt;

pub use builtin::DEFAULT_ROLE_ID;
pub use catalog::{Catalog, PublicRoleInfo, PublicSkillInfo, RoleDefinition, SkillDefinition};
pub use error::{CatalogError, HistoryError, PromptError};
pub use history::{
    format_history, history_from_value, parse_history, trim_history, ConversationMessage, Speaker,
    MAX_HISTORY_MESSAGES,
};
pub use prompt::{
    build_conversation_prompt, build_skill_prompt, CONVERSATION_CLOSING, SKILL_CLOSING,
};
