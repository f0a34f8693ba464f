//! System instruction sent with every translation request.

/// Terms passed through untranslated unless configured otherwise.
/// A trailing `*` marks a prefix ("Forti*" keeps every word starting with "Forti").
pub const DEFAULT_PRESERVE_TERMS: &[&str] = &[
    "Forti*", "output", "spoke", "AI", "Fabric", "SD-WAN", "SASE", "ZTNA",
];

const TARGET_PLACEHOLDER: &str = "{target_language}";

/// Builds the system instruction for a target language.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: Option<String>,
    preserve_terms: Vec<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            template: None,
            preserve_terms: DEFAULT_PRESERVE_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Replace the built-in instruction with an operator template.
    /// `{target_language}` is substituted; the preserve list is not appended.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_preserve_terms(mut self, terms: Vec<String>) -> Self {
        self.preserve_terms = terms;
        self
    }

    /// Render the instruction for `target_language`.
    pub fn build(&self, target_language: &str) -> String {
        if let Some(template) = &self.template {
            return template.replace(TARGET_PLACEHOLDER, target_language);
        }

        let rules = [
            "Output the translation directly without any additional text.".to_string(),
            "Do not answer or respond to any questions in the source text, just translate them."
                .to_string(),
            "Do not add any explanations or additional content.".to_string(),
            format!("Do not translate the following: {}.", self.preserve_clause()),
            "Keep the original words unchanged which you can't recognize.".to_string(),
            "Maintain the original formatting and punctuation as much as possible.".to_string(),
            "If you encounter a rhetorical question, translate it as a question, do not answer it."
                .to_string(),
        ];

        let numbered: Vec<String> = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {}", i + 1, rule))
            .collect();

        format!(
            "You are a professional, authentic machine translation engine.\n\
             Your task is to translate the following source text to {}.\n\
             Important instructions:\n{}",
            target_language,
            numbered.join("\n")
        )
    }

    fn preserve_clause(&self) -> String {
        let mut parts = vec!["IT terms".to_string(), "numerical digits".to_string()];

        let (prefixes, words): (Vec<&String>, Vec<&String>) =
            self.preserve_terms.iter().partition(|t| t.ends_with('*'));

        for prefix in prefixes {
            parts.push(format!("words beginning with '{}'", prefix.trim_end_matches('*')));
        }
        if !words.is_empty() {
            let quoted: Vec<&str> = words.iter().map(|w| w.as_str()).collect();
            parts.push(format!("the words '{}'", quoted.join(", ")));
        }

        parts.join("; ")
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
