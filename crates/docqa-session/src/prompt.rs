//! Prompt templates for answering, question suggestion and summaries.

use docqa_core::ContextBundle;

/// Assemble the answer prompt. Empty context sections are left out.
pub fn answer_prompt(
    instruction: &str,
    history: &str,
    bundle: &ContextBundle,
    query: &str,
) -> String {
    let mut prompt = format!(
        "You are a helpful AI assistant. {}\n\nPrevious conversation:\n{}\n\n",
        instruction, history
    );

    if bundle.has_document_context() {
        prompt.push_str(&format!(
            "Document Context:\n{}\n\n",
            bundle.document_context
        ));
    }

    if bundle.has_web_context() {
        prompt.push_str(&format!("{}\n\n", bundle.web_context));
    }

    prompt.push_str(&format!("User Question: {}\n\nAnswer:", query));
    prompt
}

pub fn questions_prompt(document: &str, count: usize) -> String {
    format!(
        "Analyze this document and generate {count} insightful, relevant questions that \
         would help someone understand the key concepts better.\n\n\
         Requirements:\n\
         - Questions should be specific to the document content\n\
         - Questions should be thought-provoking and require understanding\n\
         - Questions should cover different aspects of the document\n\
         - Each question should be clear and concise\n\
         - Focus on important concepts, not trivial details\n\n\
         Format: Return only the questions, numbered 1., 2., 3.\n\n\
         DOCUMENT:\n{document}\n\nQUESTIONS:"
    )
}

pub fn summary_prompt(document: &str) -> String {
    format!(
        "Create a comprehensive summary of this document.\n\n\
         Include:\n\
         - Main topic and purpose\n\
         - Key points and findings\n\
         - Important conclusions or recommendations\n\
         - Critical information\n\n\
         Keep the summary clear, concise, and well-structured.\n\n\
         DOCUMENT:\n{document}\n\nSUMMARY:"
    )
}

/// Extract list items from a model response, dropping their numbering.
pub fn parse_questions(response: &str, count: usize) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.starts_with(|c: char| c.is_ascii_digit())
                || line.starts_with('-')
                || line.starts_with('•')
        })
        .map(|line| {
            line.trim_start_matches(|c: char| c.is_ascii_digit() || ".-•) ".contains(c))
                .trim()
                .to_string()
        })
        .filter(|question| !question.is_empty())
        .take(count)
        .collect()
}
