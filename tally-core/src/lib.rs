//! tally-core: Feedback question engine
//!
//! This crate models the questions of a feedback session and everything
//! that happens to their answers:
//!
//! - **Question types** - nine [`QuestionType`]s, each a settings struct in [`kinds`]
//!   implementing [`kinds::QuestionKind`], dispatched through [`QuestionSettings`]
//! - **Editing** - [`QuestionEditor`] adds, configures, reorders and deletes questions
//! - **Submission** - [`SubmissionManager`] collects drafts and freezes them atomically
//! - **Aggregation** - [`ResultsService`] reduces submitted answers to [`Summary`] values
//! - **Templates** - [`TemplateCatalog`] ships a built-in catalogue loaded from TOML
//!
//! Persistence and rosters are collaborator traits in [`storage`]; in-memory
//! implementations are provided for tools and tests.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tally_core::storage::{MemoryQuestionStore, MemoryResponseStore};
//! use tally_core::{EngineConfig, QuestionEditor, QuestionType, TemplateCatalog};
//!
//! async fn example() -> tally_core::Result<()> {
//!     let questions = Arc::new(MemoryQuestionStore::new());
//!     let responses = Arc::new(MemoryResponseStore::new());
//!     let editor = QuestionEditor::new(
//!         questions,
//!         responses,
//!         TemplateCatalog::builtin()?.shared(),
//!         EngineConfig::default(),
//!     );
//!
//!     let session = editor.create_session("Sprint 4 retro").await?;
//!     let question = editor.add_question(session.id, QuestionType::Mcq, None).await?;
//!     println!("added {} at position {}", question.id, question.display_order);
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod config;
pub mod editing;
pub mod error;
pub mod kinds;
mod locks;
pub mod question;
pub mod question_type;
pub mod registry;
pub mod response;
pub mod storage;
pub mod submission;
pub mod summary;
pub mod templates;
pub mod types;
pub mod validation;

// Re-export key types for convenience
pub use aggregation::{QuestionResult, ResponseStats, ResultsService, aggregate_question, aggregate_session};
pub use config::{DraftPolicy, EngineConfig, RawEngineConfig};
pub use editing::QuestionEditor;
pub use error::{Error, Result};
pub use question::{FeedbackSession, Question, TemplateQuestion};
pub use question_type::{QuestionType, RecipientScope};
pub use registry::{QuestionSettings, ResponseDetails};
pub use response::{Response, ResponseKey, ResponseStatus, SubmissionState};
pub use submission::{Draft, SubmissionManager};
pub use summary::Summary;
pub use templates::TemplateCatalog;
pub use types::{QuestionId, RecipientId, RespondentId, ResponseId, SessionId, TemplateId};
pub use validation::{FieldViolation, ValidationResult};
