//! Agent Runtime - turns chat text into event store operations
//!
//! The runtime is the "brain" of almanac:
//! - Classifies a free-text message into one of five function calls via an LLM
//! - Enforces the single-operator authorization policy on mutations
//! - Executes the matching event store operation and formats its reply
//!
//! # Architecture
//!
//! Each message runs through a constrained loop:
//! 1. **Classification** (`classifier`) - NL → [`almanac_core::Classification`]
//! 2. **Authorization** (`guardrails`) - mutating intents need the privileged caller
//! 3. **Execution** (`store`) - repository call + reply text
//! 4. **Response** (`runtime`) - acknowledgement and result sent through the chat gateway
//!
//! # Safety Principle
//!
//! The LLM is strictly a translator. It never decides who may write to the
//! store, and its arguments are validated before any store call.

pub mod classifier;
pub mod guardrails;
pub mod llm;
pub mod runtime;
pub mod store;
pub mod tools;

pub use classifier::IntentClassifier;
pub use guardrails::{AuthorizationPolicy, GuardedAction, GuardrailDecision};
pub use llm::{FunctionCall, FunctionCallRequest, FunctionCallingClient, GeminiClient, LlmError};
pub use runtime::{AgentRuntime, DispatchOutcome};
pub use store::{EventStore, StoreError};
pub use tools::{FunctionDeclaration, ToolRegistry};
