//! Orchestrator tests against a scripted model client and a throwaway
//! document index.

mod support;

mod sql_branch;
