use almanac_core::MessageFormat;

pub const GREETING: &str = "Hello how can I help you";
pub const THANKS_REPLY: &str = "Happy to help.";
pub const HELP_TEXT: &str = "Almanac keeps track of upcoming exams, events and other important \
dates. Ask in plain language to list events, look one up by name or see everything before a \
date. Only the operator can add, update or delete events; everyone else can query them.\n\
Available commands:\n\
/hello: To say hello.\n\
/thanks: To say thanks.\n\
/help: Show this message.\n\
/delete: Remove events dated today or earlier (operator only).";

/// A reply produced without going through the chat gateway directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageTemplate {
    pub text: String,
    pub format: MessageFormat,
}

impl MessageTemplate {
    pub fn markdown(text: impl Into<String>) -> Self {
        Self { text: text.into(), format: MessageFormat::Markdown }
    }
}

pub fn greeting_message() -> MessageTemplate {
    MessageTemplate::markdown(GREETING)
}

pub fn thanks_message() -> MessageTemplate {
    MessageTemplate::markdown(THANKS_REPLY)
}

pub fn help_message() -> MessageTemplate {
    MessageTemplate::markdown(HELP_TEXT)
}

#[cfg(test)]
mod tests {
    use almanac_core::MessageFormat;

    use super::{help_message, HELP_TEXT};

    #[test]
    fn help_lists_every_command() {
        for command in ["/hello", "/thanks", "/help", "/delete"] {
            assert!(HELP_TEXT.contains(command), "help should mention {command}");
        }
        assert_eq!(help_message().format, MessageFormat::Markdown);
    }
}
