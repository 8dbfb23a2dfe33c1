//! Mana costs parsed from printed cost strings.
//!
//! Both the braced form (`{2}{W}{W}`) and the bare form (`2WW`) are
//! accepted. A few symbols are folded into simpler requirements:
//!
//! - hybrid pips (`{W/U}`, `{2/W}`) count as one generic
//! - Phyrexian pips (`{W/P}`) count as their colored pip
//! - snow (`{S}`) counts as generic
//! - `X`, `Y`, `Z` are recorded in `x_count` and treated as zero
//!
//! ```
//! use rust_goldfish::mana::{ManaColor, ManaCost};
//!
//! let cost = ManaCost::parse("{X}{2}{W}{W}").unwrap();
//! assert_eq!(cost.pips(ManaColor::White), 2);
//! assert_eq!(cost.generic, 2);
//! assert_eq!(cost.x_count, 1);
//! assert_eq!(cost.mana_value(), 4);
//! assert_eq!(ManaCost::parse("2WW").unwrap(), ManaCost::parse("{2}{W}{W}").unwrap());
//! ```

use serde::{Deserialize, Serialize};

use super::color::{ColorSet, ManaColor};
use crate::core::{SimError, SimResult};

/// A structured mana requirement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    /// Colored pips in WUBRG order.
    pub colored: [u8; 5],
    /// Explicit colorless pips (`{C}`).
    pub colorless: u8,
    /// Generic requirement, payable by anything.
    pub generic: u8,
    /// Number of variable components. Treated as zero when paying.
    pub x_count: u8,
}

impl ManaCost {
    /// The zero cost.
    pub const FREE: ManaCost = ManaCost {
        colored: [0; 5],
        colorless: 0,
        generic: 0,
        x_count: 0,
    };

    /// A purely generic cost.
    #[must_use]
    pub const fn generic(amount: u8) -> Self {
        Self {
            colored: [0; 5],
            colorless: 0,
            generic: amount,
            x_count: 0,
        }
    }

    /// Add pips of a color (builder style). `Colorless` adds explicit
    /// colorless pips; `Any` adds generic. Counts saturate at 255.
    #[must_use]
    pub fn with_pips(self, color: ManaColor, count: u8) -> Self {
        self.checked_with_pips(color, count).unwrap_or_else(|| {
            let mut full = self;
            *full.slot(color) = u8::MAX;
            full
        })
    }

    /// Add pips of a color, `None` if the count would overflow.
    #[must_use]
    pub fn checked_with_pips(mut self, color: ManaColor, count: u8) -> Option<Self> {
        let slot = self.slot(color);
        *slot = slot.checked_add(count)?;
        Some(self)
    }

    fn slot(&mut self, color: ManaColor) -> &mut u8 {
        match color.color_index() {
            Some(i) => &mut self.colored[i],
            None if color == ManaColor::Colorless => &mut self.colorless,
            None => &mut self.generic,
        }
    }

    /// Add to the generic requirement (commander tax, cost increases).
    #[must_use]
    pub fn plus_generic(mut self, amount: u8) -> Self {
        self.generic = self.generic.saturating_add(amount);
        self
    }

    /// Pips of one color.
    #[must_use]
    pub fn pips(&self, color: ManaColor) -> u8 {
        match color.color_index() {
            Some(i) => self.colored[i],
            None if color == ManaColor::Colorless => self.colorless,
            None => 0,
        }
    }

    /// Total colored pips.
    #[must_use]
    pub fn colored_total(&self) -> u32 {
        self.colored.iter().map(|&p| u32::from(p)).sum()
    }

    /// Mana value with X = 0. This is also the number of sources a payment
    /// consumes.
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.colored_total() + u32::from(self.colorless) + u32::from(self.generic)
    }

    /// Number of sources a payment of this cost commits.
    #[must_use]
    pub fn pips_required(&self) -> usize {
        self.mana_value() as usize
    }

    /// Colors this cost requires.
    #[must_use]
    pub fn colors(&self) -> ColorSet {
        ColorSet::from_colors(
            ManaColor::COLORS
                .into_iter()
                .filter(|c| self.pips(*c) > 0),
        )
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.mana_value() == 0
    }

    #[must_use]
    pub fn has_x(&self) -> bool {
        self.x_count > 0
    }

    /// Parse a printed cost string.
    ///
    /// The error carries an empty card name; callers that know the card
    /// fill it in.
    pub fn parse(text: &str) -> SimResult<Self> {
        let invalid = || SimError::InvalidCostString {
            card: String::new(),
            cost: text.to_string(),
        };

        let trimmed = text.trim();
        let mut cost = ManaCost::FREE;
        if trimmed.is_empty() {
            return Ok(cost);
        }

        if trimmed.contains('{') {
            let mut rest = trimmed;
            while !rest.is_empty() {
                rest = rest.trim_start();
                if rest.is_empty() {
                    break;
                }
                let inner = rest.strip_prefix('{').ok_or_else(invalid)?;
                let close = inner.find('}').ok_or_else(invalid)?;
                cost.apply_symbol(&inner[..close]).ok_or_else(invalid)?;
                rest = &inner[close + 1..];
            }
        } else {
            let mut chars = trimmed.chars().peekable();
            while let Some(c) = chars.next() {
                if c.is_ascii_digit() {
                    let mut number = String::from(c);
                    while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                        number.push(d);
                        chars.next();
                    }
                    cost.apply_symbol(&number).ok_or_else(invalid)?;
                } else if !c.is_whitespace() {
                    cost.apply_symbol(c.encode_utf8(&mut [0; 4])).ok_or_else(invalid)?;
                }
            }
        }
        Ok(cost)
    }

    fn apply_symbol(&mut self, symbol: &str) -> Option<()> {
        let symbol = symbol.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return None;
        }
        if let Ok(n) = symbol.parse::<u8>() {
            self.generic = self.generic.checked_add(n)?;
            return Some(());
        }
        if let Some((left, right)) = symbol.split_once('/') {
            if right == "P" {
                let color = single_color(left)?;
                *self = self.checked_with_pips(color, 1)?;
            } else {
                // Validate both halves, then fold the hybrid into generic.
                hybrid_half(left)?;
                hybrid_half(right)?;
                self.generic = self.generic.checked_add(1)?;
            }
            return Some(());
        }
        match symbol.as_str() {
            "X" | "Y" | "Z" => self.x_count = self.x_count.checked_add(1)?,
            "S" => self.generic = self.generic.checked_add(1)?,
            "C" => self.colorless = self.colorless.checked_add(1)?,
            other => {
                let color = single_color(other)?;
                *self = self.checked_with_pips(color, 1)?;
            }
        }
        Some(())
    }
}

fn single_color(symbol: &str) -> Option<ManaColor> {
    match symbol {
        "W" => Some(ManaColor::White),
        "U" => Some(ManaColor::Blue),
        "B" => Some(ManaColor::Black),
        "R" => Some(ManaColor::Red),
        "G" => Some(ManaColor::Green),
        _ => None,
    }
}

fn hybrid_half(symbol: &str) -> Option<()> {
    if symbol == "C" || symbol.parse::<u8>().is_ok() || single_color(symbol).is_some() {
        Some(())
    } else {
        None
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_free() && !self.has_x() {
            return f.write_str("{0}");
        }
        for _ in 0..self.x_count {
            f.write_str("{X}")?;
        }
        if self.generic > 0 {
            write!(f, "{{{}}}", self.generic)?;
        }
        for color in ManaColor::COLORS {
            for _ in 0..self.pips(color) {
                write!(f, "{{{}}}", color)?;
            }
        }
        for _ in 0..self.colorless {
            f.write_str("{C}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ManaCost {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
