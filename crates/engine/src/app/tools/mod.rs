mod path_prompt;

pub(crate) use path_prompt::{PathPrompt, PromptEvent};
