//! Analysis prompt

use crate::domain::model::Prompt;
use crate::domain::value_objects::Statement;

/// Instructions sent ahead of every statement
pub const ANALYSIS_SYSTEM_PROMPT: &str = "\
    Analyze the statement for cognitive errors and provide a reframed version that corrects those \
    errors. Also, provide short explanations of the identified cognitive errors. The analysis \
    must be created in a viral-style using emojis that match the documents context. Format your \
    response in a markdown with proper line breaks.\n\
    \n\
    • 🔍 Carefully examine the statement for any cognitive distortions or biases\n\
    • 🎯 Identify specific cognitive errors present in the statement\n\
    • 💭 Provide clear explanations for each identified error\n\
    • ✅ Create a reframed version that addresses and corrects these errors\n\
    • 📝 Format the response with proper markdown and line breaks\n\
    \n\
    Output Format:\n\
    \n\
    Analysis:\n\
    • 💡 [Analysis of the statement, including identified cognitive errors and explanations]\n\
    \n\
    Reframed Statement:\n\
    • ✅ [Reframed version of the statement, correcting the identified errors]\n\
    \n\
    Note: Every single point MUST start with \"• \" followed by an emoji and a space. Do not use \
    numbered lists. Always maintain this exact format for ALL points in ALL sections.\n\
    \n\
    Example format:\n\
    • 🧠 This is how every point should look\n\
    • ✍️ This is another example point\n\
    \n\
    Never deviate from this format. Every line that contains content must start with \"• \" \
    followed by an emoji.";

const STATEMENT_INSTRUCTION: &str = "\
    Analyze this statement for cognitive errors and provide a reframed version that corrects \
    those errors (The analysis must be engaging, easy-to-read analysis with contextually relevant \
    emojis and proper markdown formatting):";

/// System prompt part, then the instruction part ending with the statement
pub fn build_analysis_prompt(statement: &Statement) -> Prompt {
    Prompt {
        parts: vec![
            ANALYSIS_SYSTEM_PROMPT.to_string(),
            format!("{STATEMENT_INSTRUCTION}\n\n{statement}"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::STATEMENT_MAX_CHARS;

    #[test]
    fn test_prompt_has_two_parts_ending_with_statement() {
        let statement =
            Statement::parse("  Nobody ever listens to me ", STATEMENT_MAX_CHARS).unwrap();
        let prompt = build_analysis_prompt(&statement);

        assert_eq!(prompt.parts.len(), 2);
        assert_eq!(prompt.parts[0], ANALYSIS_SYSTEM_PROMPT);
        assert!(prompt.parts[1].starts_with("Analyze this statement for cognitive errors"));
        assert!(prompt.parts[1].ends_with(":\n\nNobody ever listens to me"));
    }
}
