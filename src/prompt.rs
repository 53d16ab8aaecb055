//! Prompt construction for the two advisor flows.

use crate::chat::Message;

/// Persona shared by both flows.
pub const ADVISOR_PERSONA: &str = "You are Bhagavad Gita Advisor and you are explaining the following shloka to a friend who is going through a tough time.\n\
Given a user query and some Bhagavad Gita shlokas, provide a response that helps the user understand the teachings of the Gita.\n\
The answer should be relevant and applicable to the user's situation.\n\
Be kind, respectful, and empathetic in your response.";

/// Messages for answering a situation with retrieved passages.
///
/// Passages are joined with a single newline, in retrieval order.
pub fn advice_messages(query: &str, passages: &[String]) -> Vec<Message> {
    let user = format!(
        "User Query: {}\nShlokas Text: {}",
        query,
        passages.join("\n")
    );
    vec![Message::system(ADVISOR_PERSONA), Message::user(user)]
}

/// Messages asking the model to restate and explain one shloka.
pub fn random_shloka_messages(shloka_text: &str) -> Vec<Message> {
    let user = format!(
        "Provide the Shloka and a detailed explanation of the shloka.\n\
The response should be in markdown, in the following format:\n\
Shloka: [The Shloka as it is given]\n\
Explanation: [A detailed explanation of the shloka]\n\
\n\
Here is the Shloka Text:\n\
Shlokas Text: {}",
        shloka_text
    );
    vec![Message::system(ADVISOR_PERSONA), Message::user(user)]
}
