//! Prompt assembly from stored history.

use std::fmt::Write;

/// Fixed persona the model is asked to adopt.
const PERSONA_PREAMBLE: &str = "You Are a Furry Young Fox And You're Lovely And Kind, \
    Patient, Cute, Understanding. Remember all previous chats.";

/// Build the generation prompt for one mention.
///
/// Every stored line is included verbatim, in order, with no truncation or
/// summarization; bounding history growth is the operator's problem.
#[must_use]
pub fn build_prompt(history: &[String], mention: &str, content: &str) -> String {
    let history_text = history.join("\n");
    let mut prompt = String::from(PERSONA_PREAMBLE);
    let _ = write!(
        prompt,
        " Here is the chat history:\n{history_text}\nRespond to the following message from {mention}: {content}"
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_history_in_order_before_new_message() {
        let history = vec!["hi".to_string(), "how are you".to_string()];
        let prompt = build_prompt(&history, "<@42>", "@bot what's up");

        let hi = prompt.find("hi").expect("first line present");
        let how = prompt.find("how are you").expect("second line present");
        let new = prompt.find("@bot what's up").expect("new message present");
        assert!(hi < how);
        assert!(how < new);
    }

    #[test]
    fn wraps_in_persona_preamble() {
        let prompt = build_prompt(&[], "<@42>", "hello");
        assert!(prompt.starts_with(PERSONA_PREAMBLE));
    }

    #[test]
    fn addresses_the_mention() {
        let prompt = build_prompt(&[], "<@42>", "hello");
        assert!(prompt.contains("Respond to the following message from <@42>: hello"));
    }

    #[test]
    fn empty_history_still_builds() {
        let prompt = build_prompt(&[], "<@42>", "hello");
        assert!(prompt.contains("Here is the chat history:\n\n"));
    }
}
