//! Mana colors and color sets.

use serde::{Deserialize, Serialize};

/// A mana token a source can produce.
///
/// `Any` stands for "one mana of any color" and satisfies every colored pip.
/// It does not satisfy explicit colorless pips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ManaColor {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
    Any,
}

impl ManaColor {
    /// The five colors in WUBRG order.
    pub const COLORS: [ManaColor; 5] = [
        ManaColor::White,
        ManaColor::Blue,
        ManaColor::Black,
        ManaColor::Red,
        ManaColor::Green,
    ];

    /// Index into WUBRG arrays, `None` for colorless and any.
    #[must_use]
    pub const fn color_index(self) -> Option<usize> {
        match self {
            ManaColor::White => Some(0),
            ManaColor::Blue => Some(1),
            ManaColor::Black => Some(2),
            ManaColor::Red => Some(3),
            ManaColor::Green => Some(4),
            ManaColor::Colorless | ManaColor::Any => None,
        }
    }

    /// Is this one of the five colors?
    #[must_use]
    pub const fn is_colored(self) -> bool {
        self.color_index().is_some()
    }

    /// Short symbol used in cost strings and traces.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            ManaColor::White => "W",
            ManaColor::Blue => "U",
            ManaColor::Black => "B",
            ManaColor::Red => "R",
            ManaColor::Green => "G",
            ManaColor::Colorless => "C",
            ManaColor::Any => "Any",
        }
    }

    /// Parse a production token (`W`, `u`, `Colorless`, `any`, ...).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "w" | "white" => Some(ManaColor::White),
            "u" | "blue" => Some(ManaColor::Blue),
            "b" | "black" => Some(ManaColor::Black),
            "r" | "red" => Some(ManaColor::Red),
            "g" | "green" => Some(ManaColor::Green),
            "c" | "colorless" => Some(ManaColor::Colorless),
            "any" | "*" => Some(ManaColor::Any),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl std::fmt::Display for ManaColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A set of mana tokens, stored as a bit set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSet(u8);

impl ColorSet {
    /// The empty set.
    pub const EMPTY: ColorSet = ColorSet(0);

    /// A set with one token.
    #[must_use]
    pub const fn single(color: ManaColor) -> Self {
        Self(color.bit())
    }

    /// Build from a list of tokens.
    pub fn from_colors(colors: impl IntoIterator<Item = ManaColor>) -> Self {
        colors.into_iter().fold(Self::EMPTY, ColorSet::with)
    }

    /// Parse production tokens. Returns `None` if any token is unknown.
    pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Option<Self> {
        tokens
            .iter()
            .map(|t| ManaColor::from_token(t.as_ref()))
            .collect::<Option<Vec<_>>>()
            .map(Self::from_colors)
    }

    /// Add a token (builder style).
    #[must_use]
    pub const fn with(self, color: ManaColor) -> Self {
        Self(self.0 | color.bit())
    }

    /// Union of two sets.
    #[must_use]
    pub const fn union(self, other: ColorSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Is the literal token in the set?
    #[must_use]
    pub const fn contains(self, color: ManaColor) -> bool {
        self.0 & color.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Produces one mana of any color.
    #[must_use]
    pub const fn is_any(self) -> bool {
        self.contains(ManaColor::Any)
    }

    /// Can this set pay a pip of `color`?
    ///
    /// For the five colors, `Any` also matches. For `Colorless` only a
    /// literal colorless token matches.
    #[must_use]
    pub const fn satisfies(self, color: ManaColor) -> bool {
        if color.is_colored() {
            self.contains(color) || self.is_any()
        } else {
            self.contains(color)
        }
    }

    /// Number of distinct pip kinds this set can pay (WUBRG + C).
    #[must_use]
    pub fn flexibility(self) -> u32 {
        let colored = ManaColor::COLORS
            .iter()
            .filter(|&&c| self.satisfies(c))
            .count() as u32;
        colored + u32::from(self.contains(ManaColor::Colorless))
    }

    /// The five colors this set can pay, in WUBRG order.
    pub fn colors(self) -> impl Iterator<Item = ManaColor> {
        ManaColor::COLORS
            .into_iter()
            .filter(move |&c| self.satisfies(c))
    }

    /// Literal tokens in the set.
    pub fn tokens(self) -> impl Iterator<Item = ManaColor> {
        [
            ManaColor::White,
            ManaColor::Blue,
            ManaColor::Black,
            ManaColor::Red,
            ManaColor::Green,
            ManaColor::Colorless,
            ManaColor::Any,
        ]
        .into_iter()
        .filter(move |&c| self.contains(c))
    }

    /// Colors in `wanted` this set cannot pay.
    #[must_use]
    pub fn missing_from(self, wanted: ColorSet) -> ColorSet {
        ColorSet::from_colors(wanted.colors().filter(|&c| !self.satisfies(c)))
    }
}

impl std::fmt::Display for ColorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for token in self.tokens() {
            write!(f, "{{{}}}", token)?;
        }
        Ok(())
    }
}
