/// Case-insensitive whole-title keyword filter. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    /// Blank entries are dropped, so `""` and `"%"` style inputs yield a match-all filter.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|keyword| keyword.as_ref().trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn matches(&self, title: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let title = title.to_lowercase();
        self.keywords.iter().any(|keyword| *keyword == title)
    }
}
