use std::fmt;

/// The only failure `research_company` surfaces to its caller. Upstream
/// failures are downgraded to empty fields and never show up here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchError {
    /// The company name was empty or whitespace only.
    BlankName,
}

impl fmt::Display for ResearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResearchError::BlankName => f.write_str("company name must not be blank"),
        }
    }
}

impl std::error::Error for ResearchError {}
