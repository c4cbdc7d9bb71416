//! The chat orchestration graph.
//!
//! A small state machine over [`ChatState`]: route, then either the RAG
//! path (retrieve, grade, generate, optionally evaluate) or the SQL path.
//! Each node is a free function taking the context and the state, which
//! keeps them individually testable.

use crate::context::AgentContext;
use crate::sql;
use crate::state::ChatState;
use clerk_core::{AppError, AppResult};
use clerk_prompt::{
    answer_grader_prompt, parse_grade, parse_route, prompt_vars, qa_prompt,
    relevance_grader_prompt, router_prompt, sql_generation_prompt, Route,
};
use clerk_retrieval::Chunk;
use futures::stream::{self, StreamExt};

/// Answer substituted when the quality gate rejects a generation.
pub const FALLBACK_ANSWER: &str = "Sorry, I don't have enough context for the question asked. \
I cannot provide a reliable answer at the moment, please add more context. \
I can answer questions about store procedures, policies and other related topics.";

/// Steps of the orchestration graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Route,
    Retrieve,
    GradeDocuments,
    Generate,
    Evaluate,
    SqlAnswer,
    Done,
}

/// Run the full graph for one question.
pub async fn run(ctx: &AgentContext, question: &str) -> AppResult<ChatState> {
    let mut state = ChatState::new(question);
    let mut step = Step::Route;

    while step != Step::Done {
        step = match step {
            Step::Route => match route(ctx, &state).await {
                Route::Rag => Step::Retrieve,
                Route::Sql => Step::SqlAnswer,
            },
            Step::Retrieve => {
                retrieve(ctx, &mut state).await?;
                Step::GradeDocuments
            }
            Step::GradeDocuments => {
                grade_documents(ctx, &mut state).await?;
                Step::Generate
            }
            Step::Generate => {
                generate(ctx, &mut state).await?;
                if ctx.evaluate {
                    Step::Evaluate
                } else {
                    Step::Done
                }
            }
            Step::Evaluate => {
                evaluate(ctx, &mut state).await?;
                Step::Done
            }
            Step::SqlAnswer => {
                sql_answer(ctx, &mut state).await?;
                Step::Done
            }
            Step::Done => Step::Done,
        };
    }

    Ok(state)
}

/// Decide between the document store and the SQL database.
///
/// Routing is best-effort: without a configured database, or when the
/// router's output fails to parse, the question goes to the RAG path.
async fn route(ctx: &AgentContext, state: &ChatState) -> Route {
    if ctx.sql_database.is_none() {
        return Route::Rag;
    }

    let result = async {
        let prompt = router_prompt().render(&prompt_vars! {
            "question" => state.question.as_str(),
        })?;
        let request = ctx.request(prompt).with_json_format();
        let response = ctx.llm.complete(&request).await?;
        parse_route(&response.content)
    }
    .await;

    match result {
        Ok(route) => {
            tracing::info!("Routed question to {:?}", route);
            route
        }
        Err(e) if sql::looks_like_sql(&state.question) => {
            tracing::warn!("Routing failed ({}), question looks like SQL", e);
            Route::Sql
        }
        Err(e) => {
            tracing::warn!("Routing failed ({}), falling back to document store", e);
            Route::Rag
        }
    }
}

async fn retrieve(ctx: &AgentContext, state: &mut ChatState) -> AppResult<()> {
    state.documents = ctx.retriever.retrieve(&state.question).await?;
    tracing::info!("Retrieved {} documents", state.documents.len());
    Ok(())
}

/// Grade each retrieved document for relevance and keep only the relevant
/// ones, preserving retrieval order.
///
/// Gradings run concurrently up to `grade_concurrency`. A malformed grading
/// response excludes that document with a warning rather than failing the
/// whole turn; model transport errors still propagate.
async fn grade_documents(ctx: &AgentContext, state: &mut ChatState) -> AppResult<()> {
    let question = state.question.clone();
    let documents = std::mem::take(&mut state.documents);

    let graded: Vec<AppResult<Option<Chunk>>> = stream::iter(documents.into_iter().map(|doc| {
        let question = question.clone();
        async move {
            let prompt = relevance_grader_prompt().render(&prompt_vars! {
                "question" => question.as_str(),
                "document" => doc.text.as_str(),
            })?;
            let request = ctx.request(prompt).with_json_format();
            let response = ctx.llm.complete(&request).await?;

            match parse_grade(&response.content) {
                Ok(grade) if grade.score.is_yes() => Ok(Some(doc)),
                Ok(_) => {
                    tracing::debug!("Document {} graded not relevant", doc.id);
                    Ok(None)
                }
                Err(AppError::GradeParse(msg)) => {
                    tracing::warn!(
                        "Dropping document {}: malformed grading response ({})",
                        doc.id,
                        msg
                    );
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        }
    }))
    .buffered(ctx.grade_concurrency.max(1))
    .collect()
    .await;

    let mut kept = Vec::new();
    for result in graded {
        if let Some(doc) = result? {
            kept.push(doc);
        }
    }

    tracing::info!("{} documents survived relevance grading", kept.len());
    state.documents = kept;
    Ok(())
}

/// Generate the answer over whatever documents survived grading.
///
/// Runs even with an empty document set; the QA prompt instructs the model
/// to admit when it does not know.
async fn generate(ctx: &AgentContext, state: &mut ChatState) -> AppResult<()> {
    let context = state
        .documents
        .iter()
        .map(|doc| doc.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = qa_prompt().render(&prompt_vars! {
        "question" => state.question.as_str(),
        "context" => context.as_str(),
    })?;
    let response = ctx.llm.complete(&ctx.request(prompt)).await?;

    state.generation = Some(response.content);
    Ok(())
}

/// Quality gate over the generation. A "no" from the answer grader replaces
/// the generation with [`FALLBACK_ANSWER`]; there is no regeneration
/// attempt. A malformed grading response passes the generation through.
async fn evaluate(ctx: &AgentContext, state: &mut ChatState) -> AppResult<()> {
    let generation = state.generation.clone().unwrap_or_default();

    let prompt = answer_grader_prompt().render(&prompt_vars! {
        "question" => state.question.as_str(),
        "generation" => generation.as_str(),
    })?;
    let request = ctx.request(prompt).with_json_format();
    let response = ctx.llm.complete(&request).await?;

    match parse_grade(&response.content) {
        Ok(grade) if grade.score.is_yes() => {
            tracing::info!("Answer accepted by quality gate");
        }
        Ok(_) => {
            tracing::info!("Answer rejected by quality gate, using fallback");
            state.generation = Some(FALLBACK_ANSWER.to_string());
        }
        Err(AppError::GradeParse(msg)) => {
            tracing::warn!("Malformed quality-gate response ({}), keeping answer", msg);
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Answer from the SQL database: introspect the schema, have the model
/// generate a query, validate the referenced tables, execute read-only.
async fn sql_answer(ctx: &AgentContext, state: &mut ChatState) -> AppResult<()> {
    let db_path = ctx
        .sql_database
        .as_deref()
        .ok_or_else(|| AppError::Sql("No SQL database configured".to_string()))?;

    let schema = sql::introspect_schema(db_path)?;
    let prompt = sql_generation_prompt().render(&prompt_vars! {
        "user_input" => state.question.as_str(),
        "table_related_info" => schema.to_json()?.as_str(),
    })?;
    let response = ctx.llm.complete(&ctx.request(prompt)).await?;

    let query = sql::extract_sql_query(&response.content).ok_or_else(|| {
        AppError::Sql(format!(
            "Model response contained no SQL statement: {}",
            response.content
        ))
    })?;

    if !sql::tables_exist(db_path, &query)? {
        return Err(AppError::Sql(format!(
            "Generated query references unknown tables: {}",
            query
        )));
    }

    tracing::info!("Executing generated query: {}", query);
    state.generation = Some(sql::execute_query(db_path, &query)?);
    Ok(())
}
