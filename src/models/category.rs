use crate::constants::OTHERS_CATEGORY;
use crate::security::validate_file_name;

/// One row of the category table: a label and the extensions that map to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub label: String,
    /// Lower-case extensions without the leading dot
    pub extensions: Vec<String>,
}

/// Maps file names to category labels by extension
///
/// The table is static for the lifetime of the process, so the same file
/// name always maps to the same label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<CategoryRule>,
}

impl Classifier {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Parse a table of the form `images=jpg,png;docs=pdf,txt`
    ///
    /// Extensions may be written with or without the leading dot and are
    /// matched case-insensitively. Labels become folder names, so they must
    /// pass the same checks as uploaded file names.
    pub fn parse(table: &str) -> Result<Self, String> {
        let mut rules = Vec::new();

        for entry in table.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (label, extensions) = entry
                .split_once('=')
                .ok_or_else(|| format!("Invalid category entry '{}': expected label=ext,...", entry))?;

            let label = label.trim().to_string();
            validate_file_name(&label)
                .map_err(|reason| format!("Invalid category label '{}': {}", label, reason))?;

            let extensions = extensions
                .split(',')
                .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect();

            rules.push(CategoryRule { label, extensions });
        }

        Ok(Self::new(rules))
    }

    /// Return the category label for a file name, `others` when unknown
    pub fn classify(&self, file_name: &str) -> &str {
        let Some(extension) = extension_of(file_name) else {
            return OTHERS_CATEGORY;
        };

        self.rules
            .iter()
            .find(|rule| rule.extensions.iter().any(|ext| *ext == extension))
            .map(|rule| rule.label.as_str())
            .unwrap_or(OTHERS_CATEGORY)
    }

    /// Every label a file can be classified into, `others` last
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::with_capacity(self.rules.len() + 1);
        for rule in &self.rules {
            if !labels.contains(&rule.label.as_str()) {
                labels.push(&rule.label);
            }
        }
        if !labels.contains(&OTHERS_CATEGORY) {
            labels.push(OTHERS_CATEGORY);
        }
        labels
    }
}

/// Lower-cased substring after the last '.', if any
fn extension_of(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}
