//! Line reader and tokenizer for level descriptions.

use crate::{
    error::{InvalidLevel, InvalidReason},
    MAX_LEVEL_LINES, MAX_LINE_LEN,
};

/// Largest number of digits a numeric token may carry.
const MAX_DIGITS: usize = 4;

/// Keyword opening a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Keyword {
    LevelSize,
    SkyColor,
    Bgm,
    SilverCoin,
    GoldCoin,
    Crates,
    Hole,
    Passageway,
    Respawn,
    Peel,
    Geyser,
    Rope,
    Spring,
    Hydrant,
    Sign,
    Car,
    Van,
    Truck,
    Scooter,
    CarTrigger,
    HenTrigger,
}

impl Keyword {
    const ALL: [Keyword; 21] = [
        Self::LevelSize,
        Self::SkyColor,
        Self::Bgm,
        Self::SilverCoin,
        Self::GoldCoin,
        Self::Crates,
        Self::Hole,
        Self::Passageway,
        Self::Respawn,
        Self::Peel,
        Self::Geyser,
        Self::Rope,
        Self::Spring,
        Self::Hydrant,
        Self::Sign,
        Self::Car,
        Self::Van,
        Self::Truck,
        Self::Scooter,
        Self::CarTrigger,
        Self::HenTrigger,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::LevelSize => "level-size",
            Self::SkyColor => "sky-color",
            Self::Bgm => "bgm",
            Self::SilverCoin => "silver-coin",
            Self::GoldCoin => "gold-coin",
            Self::Crates => "crates",
            Self::Hole => "hole",
            Self::Passageway => "passageway",
            Self::Respawn => "respawn",
            Self::Peel => "peel",
            Self::Geyser => "geyser",
            Self::Rope => "rope",
            Self::Spring => "spring",
            Self::Hydrant => "hydrant",
            Self::Sign => "sign",
            Self::Car => "car",
            Self::Van => "van",
            Self::Truck => "truck",
            Self::Scooter => "scooter",
            Self::CarTrigger => "car-trigger",
            Self::HenTrigger => "hen-trigger",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|keyword| keyword.name() == token)
    }

    pub(crate) fn is_directive(self) -> bool {
        matches!(self, Self::LevelSize | Self::SkyColor | Self::Bgm)
    }

    /// Accepted numbers of values after the keyword, as `(min, max, label)`.
    fn arity(self) -> (usize, usize, &'static str) {
        match self {
            Self::SilverCoin | Self::GoldCoin | Self::Geyser => (1, 2, "1 or 2"),
            Self::Crates => (3, 3, "3"),
            Self::Hole | Self::Passageway | Self::CarTrigger => (2, 2, "2"),
            _ => (1, 1, "1"),
        }
    }
}

/// Tokenized line.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Statement {
    pub(crate) line: usize,
    pub(crate) keyword: Keyword,
    pub(crate) values: Vec<u32>,
}

impl Statement {
    /// Value at `index`, or `default` when the optional value was omitted.
    pub(crate) fn value_or(&self, index: usize, default: u32) -> u32 {
        self.values.get(index).copied().unwrap_or(default)
    }

    pub(crate) fn invalid(&self, reason: InvalidReason) -> InvalidLevel {
        InvalidLevel::new(self.line, reason)
    }
}

/// Splits a whole description into statements, skipping blank lines.
pub(crate) fn statements(text: &str) -> Result<Vec<Statement>, InvalidLevel> {
    let count = text.lines().count();
    if count > MAX_LEVEL_LINES {
        return Err(InvalidLevel::whole(InvalidReason::TooManyLines { count }));
    }

    let mut statements = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if let Some(statement) = statement(raw).map_err(|reason| InvalidLevel::new(line, reason))? {
            statements.push(Statement { line, ..statement });
        }
    }
    Ok(statements)
}

/// Validates then tokenizes one raw line; blank lines yield `None`.
///
/// Length and charset are checked on the trimmed line before case folding and
/// whitespace collapsing.
fn statement(raw: &str) -> Result<Option<Statement>, InvalidReason> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len > MAX_LINE_LEN {
        return Err(InvalidReason::LineTooLong { len });
    }
    if let Some(invalid) = trimmed.chars().find(|c| !allowed(*c)) {
        return Err(InvalidReason::ForbiddenCharacter(invalid));
    }
    if trimmed.is_empty() {
        return Ok(None);
    }

    let normalized = trimmed.to_ascii_lowercase();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if !(2..=5).contains(&tokens.len()) {
        return Err(InvalidReason::TokenCount {
            count: tokens.len(),
        });
    }

    let keyword = Keyword::from_token(tokens[0])
        .ok_or_else(|| InvalidReason::UnknownKeyword(tokens[0].to_owned()))?;
    let values = tokens[1..]
        .iter()
        .map(|token| number(token))
        .collect::<Result<Vec<u32>, InvalidReason>>()?;

    let (min, max, expected) = keyword.arity();
    if values.len() < min || values.len() > max {
        return Err(InvalidReason::Arity {
            keyword: keyword.name(),
            expected,
            got: values.len(),
        });
    }

    Ok(Some(Statement {
        line: 0,
        keyword,
        values,
    }))
}

fn allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '\t' || c == '-'
}

fn number(token: &str) -> Result<u32, InvalidReason> {
    if token.is_empty() || token.len() > MAX_DIGITS || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidReason::BadNumber(token.to_owned()));
    }
    token
        .parse()
        .map_err(|_| InvalidReason::BadNumber(token.to_owned()))
}
