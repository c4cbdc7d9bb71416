//! Prompt system for clerk.
//!
//! This crate provides:
//! - Handlebars-rendered prompt templates with named placeholders
//! - The prompt library consumed by the orchestrator (QA, grading, routing,
//!   query rewriting, SQL generation)
//! - Strict parsers for the grading and routing JSON contracts

pub mod library;
pub mod parse;
pub mod template;

// Re-export main types
pub use library::{
    answer_grader_prompt, hallucination_grader_prompt, qa_prompt, query_rewrite_prompt,
    relevance_grader_prompt, router_prompt, sql_generation_prompt, table_selection_prompt,
};
pub use parse::{parse_grade, parse_route, Grade, GradeScore, Route};
pub use template::PromptTemplate;
