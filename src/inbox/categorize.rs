//! Category memory — learns description tokens from committed rows and
//! suggests a category for new ones.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct CategoryMemory {
    tokens: HashMap<String, String>,
}

impl CategoryMemory {
    /// First remembered category among the description's tokens.
    pub fn suggest(&self, description: &str) -> Option<String> {
        tokenize(description)
            .into_iter()
            .find_map(|token| self.tokens.get(&token).cloned())
    }

    /// Remember `category` for every token of `description`. Later calls win.
    pub fn learn(&mut self, description: &str, category: &str) {
        for token in tokenize(description) {
            self.tokens.insert(token, category.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Lowercased alphanumeric runs longer than two characters.
fn tokenize(input: &str) -> Vec<String> {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}
