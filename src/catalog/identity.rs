use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Routing key for a tool, derived from its directory name.
///
/// Ids are pure functions of names: renaming a directory changes the id and
/// breaks links that used the old one.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(pub String);

/// Identifier for a prompt, unique within its tool when file names do not
/// collide after slugification.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(pub String);

impl ToolId {
    pub fn from_name(name: &str) -> Self {
        ToolId(slugify(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PromptId {
    /// Prompt ids combine the (possibly `/`-joined) tool name and the file's
    /// base name.
    pub fn from_parts(tool_name: &str, prompt_name: &str) -> Self {
        PromptId(slugify(&format!("{tool_name}-{prompt_name}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Lowercase `value` and collapse every run of characters outside `[a-z0-9]`
/// into a single hyphen, trimming hyphens at either end.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for ch in value.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Closed set of labels used to group tools.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Category {
    AiAssistants,
    CodeEditors,
    AiPlatforms,
    OpenSource,
    SpecializedTools,
    Other,
}

// Declaration order matters: the first category with a matching keyword wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::AiAssistants,
        &[
            "Claude Code",
            "Devin AI",
            "Manus Agent",
            "Perplexity",
            "Junie",
            "Cluely",
            "dia",
            "Comet Assistant",
            "NotionAi",
        ],
    ),
    (
        Category::CodeEditors,
        &[
            "Cursor Prompts",
            "VSCode Agent",
            "Windsurf",
            "Augment Code",
            "CodeBuddy Prompts",
            "Trae",
            "Amp",
            "Xcode",
            "Z.ai Code",
            "Qoder",
        ],
    ),
    (
        Category::AiPlatforms,
        &[
            "Google",
            "Anthropic",
            "v0 Prompts and Tools",
            "Same.dev",
            "Lovable",
            "Replit",
            "Leap.new",
        ],
    ),
    (
        Category::OpenSource,
        &[
            "Open Source prompts",
            "Bolt",
            "Cline",
            "Codex CLI",
            "Gemini CLI",
            "RooCode",
            "Lumo",
        ],
    ),
    (
        Category::SpecializedTools,
        &[
            "Warp.dev",
            "Traycer AI",
            "Orchids.app",
            "Emergent",
            "Poke",
            "Kiro",
        ],
    ),
];

/// Assign a category from a tool directory name.
///
/// Matching is case-sensitive substring containment, so
/// `"Acme Cursor Prompts Fork"` lands in `CodeEditors`.
pub fn categorize(name: &str) -> Category {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| name.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::AiAssistants,
        Category::CodeEditors,
        Category::AiPlatforms,
        Category::OpenSource,
        Category::SpecializedTools,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AiAssistants => "AI Assistants",
            Category::CodeEditors => "Code Editors",
            Category::AiPlatforms => "AI Platforms",
            Category::OpenSource => "Open Source",
            Category::SpecializedTools => "Specialized Tools",
            Category::Other => "Other",
        }
    }

    /// Accepts either the display label or its slug (`code-editors`).
    pub fn parse(value: &str) -> Option<Self> {
        let wanted = slugify(value);
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value || slugify(category.as_str()) == wanted)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known = Category::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "unknown category '{}' (expected one of: {known})", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::parse(value).ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| D::Error::custom(UnknownCategory(value)))
    }
}
