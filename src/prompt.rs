//! # Prompt
//! A prompt is simply a string
//! ## PromptTemplate
//! A prompt template is a string with placeholders.
//!
//! ## Placeholder
//! A placeholder is a string that is in the format of `{{name}}`. It can be filled with a value.
//! It has a name, which is the string inside the double braces.
//!
//! ## PartialPrompt
//! A partial prompt is a prompt template with some placeholders filled. A partial prompt can be only constructed from a prompt template via [PromptTemplate::construct_prompt].
//!
//! The placeholders in a partial prompt can be filled with values via [PartialPrompt::fill] or [PartialPrompt::try_fill]. You can also use these two methods to update the filling values of the placeholders.
//! When all placeholders are filled, the partial prompt can be completed via [PartialPrompt::complete], in which the placeholders in a template are **actually** replaced with the filling values.
//!
//! ## ChatPromptTemplate
//! A chat prompt template is an ordered list of role-tagged prompt templates. Formatting it with a set of variables
//! gives a [Conversation], which is what completion providers consume.


use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use anyhow::Result;
use crate::conversation::{Conversation, Message, Role};
use crate::prompt::errors::{PlaceholderNotExist, UnfilledPlaceholders};
use crate::utils::prompt_processing::{get_placeholders, replace_all_placeholders};
use log::warn;

/// Mapping from placeholder name to filling value.
pub type Vars = HashMap<String, String>;


/// A prompt template with some placeholders filled. A partial prompt can be only constructed from a prompt template via [PromptTemplate::construct_prompt].
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PartialPrompt {
    /// The template of the partial prompt, readonly
    #[readonly]
    pub template: PromptTemplate,

    /// Mapping from placeholder name to its filling value
    pub(crate) placeholder_to_vals: HashMap<String, Option<String>>,

    /// Record the placeholders that are not filled yet
    pub(crate) unfilled_placeholders: HashSet<String>,
}

impl PartialPrompt {
    /// Fill the placeholders in the partial prompt with the given values.
    /// Panics if the placeholder does not exist.
    pub fn fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.try_fill(placeholder, value).unwrap()
    }

    /// Fill the placeholders in the partial prompt with the given values.
    /// Returns an error if the placeholder does not exist.
    pub fn try_fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Result<&mut Self, PlaceholderNotExist> {
        let placeholder = placeholder.into();
        if self.placeholder_to_vals.contains_key(&placeholder) {
            self.unfilled_placeholders.remove(&placeholder);
            self.placeholder_to_vals.insert(placeholder, Some(value.into()));
            Ok(self)
        } else {
            Err(PlaceholderNotExist::new(placeholder, value, &self.template.placeholders))
        }
    }

    /// Fill every placeholder of this prompt that has an entry in `vars`. Entries for other names are ignored.
    pub fn fill_from(&mut self, vars: &Vars) -> &mut Self {
        for placeholder in self.template.placeholders.iter() {
            if let Some(value) = vars.get(placeholder) {
                self.unfilled_placeholders.remove(placeholder);
                self.placeholder_to_vals.insert(placeholder.clone(), Some(value.clone()));
            }
        }
        self
    }

    /// Whether all placeholders are filled.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.unfilled_placeholders.is_empty()
    }

    /// Complete the partial prompt and return the completed prompt.
    /// Returns an error if there are still unfilled placeholders.
    pub fn complete(&self) -> Result<String, UnfilledPlaceholders> {
        if self.is_complete() {
            Ok(replace_all_placeholders(self.template.str(), &self.placeholder_to_vals))
        } else {
            let mut all_placeholders: Vec<String> = self.template.placeholders.iter().cloned().collect();
            let mut unfilled_placeholders: Vec<String> = self.unfilled_placeholders.iter().cloned().collect();
            all_placeholders.sort();
            unfilled_placeholders.sort();
            Err(UnfilledPlaceholders {
                all_placeholders,
                unfilled_placeholders,
            })
        }
    }
}

/// A prompt template with placeholders.
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PromptTemplate {
    /// The template of the partial prompt, immutable
    template: Arc<String>,

    /// The placeholders in the template, readonly
    #[readonly]
    pub placeholders: HashSet<String>,
}

impl PromptTemplate {
    /// Create a prompt template from a string. Warns if the template does not have any placeholder.
    pub fn new(template: impl Into<String>) -> Self {
        let template = Self::parse(template);
        if template.placeholders.is_empty() {
            warn!("Your prompt template does not have a placeholder. If this is intended, ignore this message. \
            Otherwise, check whether you have written placeholders correctly.\n\
            Got prompt template:\n\
            {}", template.str());
        }
        template
    }

    fn parse(template: impl Into<String>) -> Self {
        let template = template.into();
        let placeholders = get_placeholders(&template);
        Self {
            template: Arc::new(template),
            placeholders,
        }
    }

    /// Get the prompt template as a string.
    #[inline]
    pub fn str(&self) -> &str {
        &self.template
    }

    /// Construct a partial prompt from the prompt template.
    pub fn construct_prompt(&self) -> PartialPrompt {
        PartialPrompt {
            template: self.clone(),
            placeholder_to_vals: self.placeholders.iter().map(|p| (p.clone(), None)).collect(),
            unfilled_placeholders: self.placeholders.clone(),
        }
    }
}

/// Ordered role-tagged prompt templates that format into a [Conversation].
#[derive(Debug, Clone)]
pub struct ChatPromptTemplate {
    messages: Vec<(Role, PromptTemplate)>,
}

impl ChatPromptTemplate {
    /// Create a chat prompt template. Single messages may be constant; warns only if no message has a placeholder.
    pub fn from_messages<I, S>(messages: I) -> Self
        where I: IntoIterator<Item=(Role, S)>,
              S: Into<String> {
        let messages: Vec<(Role, PromptTemplate)> = messages
            .into_iter()
            .map(|(role, template)| (role, PromptTemplate::parse(template)))
            .collect();
        let chat = Self { messages };
        if chat.placeholders().is_empty() {
            warn!("Your chat prompt template does not have a placeholder in any of its {} messages.", chat.messages.len());
        }
        chat
    }

    /// The message templates with their roles.
    #[inline]
    pub fn messages(&self) -> &[(Role, PromptTemplate)] {
        &self.messages
    }

    /// All placeholders across messages.
    pub fn placeholders(&self) -> HashSet<String> {
        self.messages
            .iter()
            .flat_map(|(_, template)| template.placeholders.iter().cloned())
            .collect()
    }

    /// Fill every message with `vars` and build the conversation.
    /// Returns an [UnfilledPlaceholders] error (wrapped in [anyhow::Error]) if a placeholder has no value.
    pub fn format(&self, vars: &Vars) -> Result<Conversation> {
        let messages = self.messages
            .iter()
            .map(|(role, template)| {
                let content = template.construct_prompt().fill_from(vars).complete()?;
                Ok(Message::new(*role, content))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Conversation::new(messages))
    }
}

pub mod errors {
    use std::collections::HashSet;
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;

    /// Error when trying to complete a partial prompt but there are still unfilled placeholders.
    #[derive(Debug)]
    pub struct UnfilledPlaceholders {
        pub unfilled_placeholders: Vec<String>,
        pub all_placeholders: Vec<String>,
    }

    impl fmt::Display for UnfilledPlaceholders {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "UnfilledPlaceholders: to complete the prompt template,\n  Requires Placeholders:{:?}\n  Unfilled Placeholders:{:?}",
                   self.all_placeholders, self.unfilled_placeholders)
        }
    }

    impl Error for UnfilledPlaceholders {}

    /// Error when trying to fill a placeholder that does not exist in the prompt template of the partial prompt.
    #[derive(Debug)]
    pub struct PlaceholderNotExist {
        pub try_fill_placeholder: String,
        pub value: String,
        pub available_placeholders: Vec<String>,
    }

    impl PlaceholderNotExist {
        pub(crate) fn new(try_fill_placeholder: impl Into<String>,
                          value: impl Into<String>,
                          available_placeholders: &HashSet<String>) -> Self {
            let available_placeholders = available_placeholders.iter().cloned().collect();
            PlaceholderNotExist {
                try_fill_placeholder: try_fill_placeholder.into(),
                value: value.into(),
                available_placeholders,
            }
        }
    }

    impl fmt::Display for PlaceholderNotExist {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "PlaceholderNotExist: try to fill placeholder = {} with value = {}, but available placeholders are {:?}",
                   self.try_fill_placeholder,
                   self.value,
                   self.available_placeholders)
        }
    }

    impl Error for PlaceholderNotExist {}
}

#[cfg(test)]
mod test_prompt {
    use super::errors::UnfilledPlaceholders;
    use super::{ChatPromptTemplate, PromptTemplate, Vars};
    use crate::conversation::{Message, Role};

    #[test]
    fn test_fill_and_complete() {
        let template = PromptTemplate::new("Hello {{name}}, today is {{date}}. Bye {{name}}.");
        let mut prompt = template.construct_prompt();
        assert!(prompt.complete().is_err());
        prompt.fill("name", "alice").fill("date", "Monday");
        assert_eq!("Hello alice, today is Monday. Bye alice.", prompt.complete().unwrap());
    }

    #[test]
    fn test_refill_overwrites() {
        let template = PromptTemplate::new("{{a}}");
        let mut prompt = template.construct_prompt();
        prompt.fill("a", "first").fill("a", "second");
        assert_eq!("second", prompt.complete().unwrap());
    }

    #[test]
    fn test_try_fill_unknown_placeholder() {
        let template = PromptTemplate::new("{{a}}");
        let mut prompt = template.construct_prompt();
        let err = prompt.try_fill("b", "bob").expect_err("b is not a placeholder");
        assert_eq!("b", err.try_fill_placeholder);
        assert_eq!(vec!["a".to_string()], err.available_placeholders);
    }

    #[test]
    fn test_unfilled_error_lists_missing() {
        let template = PromptTemplate::new("{{b}} {{a}}");
        let mut prompt = template.construct_prompt();
        prompt.fill("a", "x");
        let err = prompt.complete().expect_err("b is unfilled");
        assert_eq!(vec!["a".to_string(), "b".to_string()], err.all_placeholders);
        assert_eq!(vec!["b".to_string()], err.unfilled_placeholders);
    }

    #[test]
    fn test_chat_format() {
        let chat = ChatPromptTemplate::from_messages([
            (Role::System, "You are {{persona}}."),
            (Role::Human, "Do {{task}}"),
        ]);
        let vars = Vars::from([
            ("persona".to_string(), "terse".to_string()),
            ("task".to_string(), "x".to_string()),
            ("unused".to_string(), "ignored".to_string()),
        ]);
        let conversation = chat.format(&vars).unwrap();
        assert_eq!(&[Message::system("You are terse."), Message::human("Do x")], conversation.messages());
    }

    #[test]
    fn test_chat_format_missing_var() {
        let chat = ChatPromptTemplate::from_messages([(Role::System, "constant"), (Role::Human, "Do {{task}}")]);
        let err = chat.format(&Vars::new()).expect_err("task is missing");
        let err = err.downcast::<UnfilledPlaceholders>().expect("should be UnfilledPlaceholders");
        assert_eq!(vec!["task".to_string()], err.unfilled_placeholders);
    }
}
