//! Static keyword tables for the intent classifier and skill extractor.
//!
//! All matching is case-insensitive. Direction keywords and level keywords
//! match on whole words; exploratory and uncertainty phrases match as plain
//! substrings of the lowercased input.

use crate::pipeline::types::SkillDirection;

/// Minimum total score for a direction to be considered detected.
pub const MIN_SCORE: u32 = 2;
/// Top two scores closer than this are treated as ambiguous.
pub const AMBIGUITY_MARGIN: u32 = 2;
/// Score at or above which confidence is `High`.
pub const HIGH_CONFIDENCE_SCORE: u32 = 6;
/// Score at or above which confidence is `Medium`.
pub const MEDIUM_CONFIDENCE_SCORE: u32 = 3;

/// Inputs with fewer words than this are too short to extract a goal from.
pub const MIN_SPECIFIC_WORDS: usize = 3;
/// Normalized goals are truncated to this many words.
pub const MAX_GOAL_WORDS: usize = 12;

/// A weighted group of keywords. A group contributes its weight once when
/// any of its keywords appears in the input.
#[derive(Debug)]
pub struct KeywordGroup {
    pub weight: u32,
    pub keywords: &'static [&'static str],
}

#[derive(Debug)]
pub struct DirectionKeywords {
    pub direction: SkillDirection,
    pub groups: &'static [KeywordGroup],
}

/// A bare technical term that cannot be classified without context.
#[derive(Debug)]
pub struct AmbiguousTerm {
    pub term: &'static str,
    /// Any of these in the input disambiguates the term.
    pub context: &'static [&'static str],
    /// Directions offered in the clarification question.
    pub directions: &'static [SkillDirection],
}

pub static DIRECTION_KEYWORDS: &[DirectionKeywords] = &[
    DirectionKeywords {
        direction: SkillDirection::WebDevelopment,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "web development", "web developer", "web dev", "frontend", "front-end",
                    "front end", "website", "websites", "web app", "web apps",
                    "web application", "web applications", "full stack", "full-stack", "fullstack",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &[
                    "react", "vue", "angular", "svelte", "next.js", "nextjs", "html", "css",
                    "tailwind", "javascript", "typescript",
                ],
            },
            KeywordGroup {
                weight: 1,
                keywords: &["browser", "responsive", "dom", "landing page"],
            },
        ],
    },
    DirectionKeywords {
        direction: SkillDirection::MobileDevelopment,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "mobile app", "mobile apps", "mobile development", "android", "ios",
                    "iphone app", "app store", "play store",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &[
                    "flutter", "react native", "kotlin", "swift", "swiftui", "jetpack compose",
                    "xamarin",
                ],
            },
            KeywordGroup {
                weight: 1,
                keywords: &["mobile", "tablet", "java"],
            },
        ],
    },
    DirectionKeywords {
        direction: SkillDirection::DataScience,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "data science", "data scientist", "data analysis", "data analyst",
                    "data analytics", "analytics",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &[
                    "pandas", "numpy", "statistics", "sql", "tableau", "power bi", "excel",
                    "visualization", "visualisation", "jupyter",
                ],
            },
            KeywordGroup {
                weight: 1,
                keywords: &["data", "dashboard", "dashboards", "insights", "python"],
            },
        ],
    },
    DirectionKeywords {
        direction: SkillDirection::MachineLearning,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "machine learning", "artificial intelligence", "deep learning",
                    "neural network", "neural networks", "llm", "llms", "ai engineer",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &[
                    "tensorflow", "pytorch", "scikit-learn", "sklearn", "nlp",
                    "computer vision", "transformers", "chatbot", "chatbots",
                ],
            },
            KeywordGroup {
                weight: 1,
                keywords: &["ai", "model training", "prediction", "predictions", "python"],
            },
        ],
    },
    DirectionKeywords {
        direction: SkillDirection::BackendEngineering,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "backend", "back-end", "back end", "server-side", "api development",
                    "apis", "microservices",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &[
                    "node.js", "nodejs", "express", "django", "flask", "spring", "spring boot",
                    "golang", "rust", "postgres", "postgresql", "mongodb", "graphql", "rest api",
                ],
            },
            KeywordGroup {
                weight: 1,
                keywords: &["server", "servers", "database", "databases", "java", "python"],
            },
        ],
    },
    DirectionKeywords {
        direction: SkillDirection::DevOpsCloud,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "devops", "cloud computing", "cloud engineer", "site reliability", "sre",
                    "infrastructure",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &[
                    "aws", "azure", "gcp", "docker", "kubernetes", "k8s", "terraform", "ci/cd",
                    "jenkins", "ansible",
                ],
            },
            KeywordGroup {
                weight: 1,
                keywords: &[
                    "cloud",
                    "deployment",
                    "deployments",
                    "linux",
                    "automation",
                    "pipelines",
                ],
            },
        ],
    },
    DirectionKeywords {
        direction: SkillDirection::Cybersecurity,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "cybersecurity", "cyber security", "information security", "infosec",
                    "ethical hacking", "penetration testing", "pentesting",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &[
                    "security", "malware", "cryptography", "firewall", "vulnerability",
                    "vulnerabilities", "soc analyst", "ctf",
                ],
            },
            KeywordGroup {
                weight: 1,
                keywords: &["hacking", "hacker", "network security", "privacy"],
            },
        ],
    },
    DirectionKeywords {
        direction: SkillDirection::GameDevelopment,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "game development", "game dev", "gamedev", "game developer", "video game",
                    "video games",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &[
                    "unity",
                    "unreal",
                    "unreal engine",
                    "godot",
                    "game design",
                    "c#",
                    "c++",
                ],
            },
            KeywordGroup {
                weight: 1,
                keywords: &["games", "game", "3d", "gaming"],
            },
        ],
    },
    DirectionKeywords {
        direction: SkillDirection::UiUxDesign,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "ui/ux", "ux design", "ui design", "user experience", "user interface",
                    "product design", "ux research",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &[
                    "figma", "sketch", "wireframe", "wireframes", "prototyping", "adobe xd",
                    "design systems",
                ],
            },
            KeywordGroup {
                weight: 1,
                keywords: &["design", "designer", "usability", "accessibility"],
            },
        ],
    },
    DirectionKeywords {
        direction: SkillDirection::Blockchain,
        groups: &[
            KeywordGroup {
                weight: 3,
                keywords: &[
                    "blockchain", "web3", "smart contract", "smart contracts", "defi",
                    "cryptocurrency",
                ],
            },
            KeywordGroup {
                weight: 2,
                keywords: &["solidity", "ethereum", "solana", "nft", "nfts", "dapp", "dapps"],
            },
            KeywordGroup {
                weight: 1,
                keywords: &["crypto", "token", "tokens", "wallet"],
            },
        ],
    },
];

pub static AMBIGUOUS_TERMS: &[AmbiguousTerm] = &[
    AmbiguousTerm {
        term: "java",
        context: &["android", "mobile", "spring", "backend", "server", "api", "enterprise"],
        directions: &[SkillDirection::BackendEngineering, SkillDirection::MobileDevelopment],
    },
    AmbiguousTerm {
        term: "python",
        context: &[
            "data", "django", "flask", "machine learning", "ml", "ai", "analysis", "backend",
            "automation", "pandas",
        ],
        directions: &[
            SkillDirection::DataScience,
            SkillDirection::BackendEngineering,
            SkillDirection::MachineLearning,
        ],
    },
    AmbiguousTerm {
        term: "javascript",
        context: &["react", "node", "frontend", "backend", "website", "web", "mobile"],
        directions: &[
            SkillDirection::WebDevelopment,
            SkillDirection::BackendEngineering,
            SkillDirection::MobileDevelopment,
        ],
    },
    AmbiguousTerm {
        term: "kotlin",
        context: &["android", "mobile", "backend", "server", "spring"],
        directions: &[SkillDirection::MobileDevelopment, SkillDirection::BackendEngineering],
    },
    AmbiguousTerm {
        term: "c++",
        context: &["game", "games", "unreal", "systems", "embedded"],
        directions: &[SkillDirection::GameDevelopment, SkillDirection::BackendEngineering],
    },
    AmbiguousTerm {
        term: "c#",
        context: &["unity", "game", "games", ".net", "dotnet", "backend", "web"],
        directions: &[SkillDirection::GameDevelopment, SkillDirection::BackendEngineering],
    },
    AmbiguousTerm {
        term: "sql",
        context: &["analysis", "analytics", "reports", "backend", "api", "server"],
        directions: &[SkillDirection::DataScience, SkillDirection::BackendEngineering],
    },
    AmbiguousTerm {
        term: "ai",
        context: &["data", "models", "chatbot", "vision", "nlp", "analysis"],
        directions: &[SkillDirection::MachineLearning, SkillDirection::DataScience],
    },
    AmbiguousTerm {
        term: "design",
        context: &["ui", "ux", "game", "figma", "interface", "level"],
        directions: &[SkillDirection::UiUxDesign, SkillDirection::GameDevelopment],
    },
];

/// Words ignored when deciding whether the input is a bare ambiguous term
/// (so "I want to learn Java" counts as bare "java").
pub static LEAD_IN_WORDS: &[&str] = &[
    "i", "i'm", "im", "want", "wanna", "to", "learn", "learning", "study", "studying", "get",
    "into", "better", "at", "in", "with", "more", "about", "the", "a", "an", "some", "like",
    "love", "interested", "really", "would", "i'd", "how", "use", "using", "for", "and", "me",
    "my", "do", "be", "good", "program", "programming", "code", "coding", "language",
];

/// Phrases signalling the user has not chosen a direction yet.
pub static EXPLORATORY_PHRASES: &[&str] = &[
    "not sure",
    "no idea",
    "no clue",
    "don't know",
    "dont know",
    "idk",
    "undecided",
    "haven't decided",
    "havent decided",
    "just exploring",
    "still exploring",
    "exploring options",
    "open to anything",
    "anything really",
    "figure out what",
];

// ── Skill extractor tables ──────────────────────────────────────────

pub static ADVANCED_KEYWORDS: &[&str] = &[
    "advanced", "expert", "senior", "years of experience", "in production", "production",
    "architect", "architecture", "optimize", "optimise", "scale", "scaling", "mastery", "master",
    "deep dive", "in depth", "in-depth", "lead a team",
];

pub static INTERMEDIATE_KEYWORDS: &[&str] = &[
    "intermediate", "some experience", "familiar with", "comfortable with", "built a few",
    "built some", "level up", "improve", "improving", "already know", "have used",
    "know the basics", "beyond the basics", "junior",
];

pub static BEGINNER_KEYWORDS: &[&str] = &[
    "beginner", "new to", "never", "from scratch", "basics", "fundamentals", "getting started",
    "get started", "first time", "no experience", "start learning", "zero",
];

/// Phrases that make a goal statement too vague to normalize.
pub static UNCERTAINTY_PHRASES: &[&str] = &[
    "not sure",
    "maybe",
    "i guess",
    "idk",
    "don't know",
    "dont know",
    "no idea",
    "no clue",
    "whatever",
    "not certain",
    "undecided",
];

/// Lead-in phrases stripped from the front of a goal statement. Matched
/// longest first regardless of their order here.
pub static FILLER_LEAD_INS: &[&str] = &[
    "i would really like to learn how to",
    "i would like to learn how to",
    "i'd like to learn how to",
    "i want to learn how to",
    "i wanna learn how to",
    "i would like to learn",
    "i'd like to learn",
    "i want to learn about",
    "i want to learn",
    "i wanna learn",
    "i am interested in learning",
    "i'm interested in learning",
    "i am interested in",
    "i'm interested in",
    "i am hoping to",
    "i'm hoping to",
    "i hope to",
    "my goal is to",
    "my goal is",
    "i would like to",
    "i'd like to",
    "i want to",
    "i wanna",
    "i plan to",
    "i need to",
    "help me",
    "teach me",
    "learn how to",
    "learn about",
    "learn to",
    "learning",
    "learn",
];

pub const EMPTY_INPUT_QUESTION: &str =
    "What would you like to learn? For example: building websites, analysing data, or making games.";

pub const EXPLORATORY_QUESTION: &str = "No problem! Which of these sounds most exciting to you: \
     building apps, working with data, designing experiences, or securing systems?";

/// Follow-up question asked when a goal statement is too vague.
pub fn clarification_question(direction: SkillDirection) -> &'static str {
    match direction {
        SkillDirection::WebDevelopment => {
            "What would you like to build for the web: a personal site, a web app, or something else?"
        }
        SkillDirection::MobileDevelopment => {
            "Which platform interests you most (Android, iOS, or cross-platform), and what app would you like to build?"
        }
        SkillDirection::DataScience => {
            "What kind of data would you like to work with, and what questions do you want to answer?"
        }
        SkillDirection::MachineLearning => {
            "Which area of AI interests you most: language models, computer vision, or predictive modelling?"
        }
        SkillDirection::BackendEngineering => {
            "What kind of system would you like to build: APIs, databases, or distributed services?"
        }
        SkillDirection::DevOpsCloud => {
            "Are you more interested in cloud platforms, containers, or automating deployments?"
        }
        SkillDirection::Cybersecurity => {
            "Which side of security appeals to you: defending systems, ethical hacking, or compliance?"
        }
        SkillDirection::GameDevelopment => {
            "What kind of game would you like to make, and do you have an engine in mind?"
        }
        SkillDirection::UiUxDesign => {
            "Are you more drawn to visual interface design or to researching how people use products?"
        }
        SkillDirection::Blockchain => {
            "Would you like to build smart contracts, decentralized apps, or understand the fundamentals?"
        }
        SkillDirection::Other => {
            "Could you tell us a bit more about what you want to achieve and where you are starting from?"
        }
    }
}
