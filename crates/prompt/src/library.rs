//! The prompt library.
//!
//! Every prompt the orchestrator binds lives here as a constructor returning
//! a [`PromptTemplate`]. Grading prompts share a strict contract: the model
//! must answer with a JSON object holding exactly one key `score` whose
//! value is the literal string `"yes"` or `"no"` - no other keys, no prose.
//! [`crate::parse::parse_grade`] enforces that contract.

use crate::template::PromptTemplate;

/// Question-answering prompt over retrieved context.
///
/// Placeholders: `question`, `context`.
pub fn qa_prompt() -> PromptTemplate {
    PromptTemplate {
        id: "qa",
        text: "\
You are an assistant answering questions for store team members. Your goal \
is to help them understand and perform store policies and procedures, and to \
answer related store queries.
Use the following pieces of retrieved context to answer the question.
If you don't know the answer, just say that you don't know.
Use six sentences maximum and keep the answer concise.
Format the answer with bullet points or numbers and line breaks.

Question: {{question}}
Context: {{context}}
Answer:",
    }
}

/// Relevance grader for a single retrieved document.
///
/// Placeholders: `question`, `document`.
pub fn relevance_grader_prompt() -> PromptTemplate {
    PromptTemplate {
        id: "relevance-grader",
        text: "\
You are a grader assessing relevance of a retrieved document to a user question.
Here is the retrieved document:

{{document}}

Here is the user question: {{question}}
If the document contains keywords or meaning related to the user question, \
grade it as relevant. It does not need to be a stringent test. The goal is to \
filter out erroneous retrievals.
Give a binary score 'yes' or 'no' to indicate whether the document is \
relevant to the question.
Provide the binary score as a JSON object with a single key 'score' and no \
preamble or explanation.",
    }
}

/// Grader for whether an answer resolves the question.
///
/// Placeholders: `question`, `generation`.
pub fn answer_grader_prompt() -> PromptTemplate {
    PromptTemplate {
        id: "answer-grader",
        text: "\
You are a grader assessing whether an answer is useful to resolve a question.
Here is the answer:
-------
{{generation}}
-------
Here is the question: {{question}}
Give a binary score 'yes' or 'no' to indicate whether the answer is useful \
to resolve the question.
Provide the binary score as a JSON object with a single key 'score' and no \
preamble or explanation.",
    }
}

/// Grader for whether a generation is grounded in the retrieved documents.
///
/// Placeholders: `documents`, `generation`.
pub fn hallucination_grader_prompt() -> PromptTemplate {
    PromptTemplate {
        id: "hallucination-grader",
        text: "\
You are a grader assessing whether an answer is grounded in a set of facts.
Follow these steps:
1. Understand the facts: read the provided store policy and procedure \
documents carefully.
2. Analyze the answer: examine whether it aligns with and is supported by \
the given facts.
3. Final decision: decide if the answer is grounded in the facts.

Here are the facts:
-------
{{documents}}
-------
Here is the answer: {{generation}}
It does not need to be a stringent test. The goal is to filter out responses \
that are not supported by the provided facts.
Give a binary score 'yes' or 'no' to indicate whether the answer is grounded \
in the given facts.
Provide the binary score as a JSON object with a single key 'score' and no \
preamble or explanation.",
    }
}

/// Question rewriter optimized for vector retrieval.
///
/// Placeholder: `question`.
pub fn query_rewrite_prompt() -> PromptTemplate {
    PromptTemplate {
        id: "query-rewrite",
        text: "\
You are a question re-writer that converts an input question into a better \
version optimized for vectorstore retrieval.
You are part of a tool that helps store team members understand and perform \
store procedures; every question relates to stores and store processes.
Look at the initial question and formulate an improved one.

Question: {{question}}",
    }
}

/// Router deciding between the document store and the SQL database.
///
/// Placeholder: `question`.
pub fn router_prompt() -> PromptTemplate {
    PromptTemplate {
        id: "router",
        text: "\
You are an expert at routing a user question to either a vectorstore of \
store policy and procedure documents or a SQL database of store records.
Use the vectorstore for questions about policies, procedures, and training. \
Use the SQL database for questions about tabular store data such as sales or \
inventory. You do not need to be stringent with keywords.
Return a JSON object with a single key 'datasource' whose value is either \
'rag' or 'sql', and no preamble or explanation.

Question to route: {{question}}",
    }
}

/// Table selection prompt for the SQL branch.
///
/// Placeholders: `user_query`, `table_metadata`.
pub fn table_selection_prompt() -> PromptTemplate {
    PromptTemplate {
        id: "table-selection",
        text: "\
You are a database assistant. Given the following table metadata:
{{table_metadata}}

Determine which table(s) are needed to answer the following user query:
\"{{user_query}}\"

Return only the table names as a JSON list. Do not merge tables.
You must strictly return ['None'] if the user query does not logically \
require data from any table.",
    }
}

/// SQL generation prompt.
///
/// Placeholders: `user_input`, `table_related_info`.
pub fn sql_generation_prompt() -> PromptTemplate {
    PromptTemplate {
        id: "sql-generation",
        text: "\
You are an expert assistant that generates SQL queries from user input in \
English.

The database schema is as follows. Table names and their column names along \
with their datatypes:
{{table_related_info}}

Instructions:
1. Read the question carefully.
2. Use only the provided schema.
3. Return ONLY the SQL query, ending with a semicolon.
4. Use SQLite syntax.
5. Do not wrap the response in backticks and do not add the word 'sql'.

Question: {{user_input}}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt_vars;

    #[test]
    fn test_qa_prompt_binds_question_and_context() {
        let rendered = qa_prompt()
            .render(&prompt_vars! {
                "question" => "how to secure high value items?",
                "context" => "secure high value items by using locked cabinets",
            })
            .unwrap();

        assert!(rendered.contains("how to secure high value items?"));
        assert!(rendered.contains("locked cabinets"));
    }

    #[test]
    fn test_grading_prompts_state_the_contract() {
        let graders = [
            relevance_grader_prompt(),
            answer_grader_prompt(),
            hallucination_grader_prompt(),
        ];
        for grader in graders {
            assert!(
                grader.text.contains("single key 'score'"),
                "{} must state the score contract",
                grader.id
            );
            assert!(grader.text.contains("'yes' or 'no'"));
        }
    }

    #[test]
    fn test_router_prompt_states_datasource_contract() {
        let rendered = router_prompt()
            .render(&prompt_vars! { "question" => "total sales last week" })
            .unwrap();
        assert!(rendered.contains("'datasource'"));
        assert!(rendered.contains("total sales last week"));
    }
}
