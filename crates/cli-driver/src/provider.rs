use std::fmt;
use std::str::FromStr;

// ─── Provider ─────────────────────────────────────────────────────────────

/// One external CLI assistant family.
///
/// The order of [`Provider::all`] is the auto-discovery priority order:
/// claude is probed before gemini.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Claude,
    Gemini,
}

impl Provider {
    pub fn all() -> [Provider; 2] {
        [Provider::Claude, Provider::Gemini]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Claude => "claude",
            Provider::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "claude" => Ok(Provider::Claude),
            "gemini" => Ok(Provider::Gemini),
            other => Err(format!("unknown provider '{other}'; valid: claude, gemini")),
        }
    }
}

// ─── Preference ───────────────────────────────────────────────────────────

/// What the caller wants discovery to try.
///
/// `Only(p)` constrains discovery to that provider's candidates — an
/// explicit request never falls back to the other family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preference {
    #[default]
    Auto,
    Only(Provider),
}

impl Preference {
    /// The providers discovery will try, in order.
    pub fn providers(&self) -> Vec<Provider> {
        match self {
            Preference::Auto => Provider::all().to_vec(),
            Preference::Only(p) => vec![*p],
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preference::Auto => f.write_str("auto"),
            Preference::Only(p) => f.write_str(p.as_str()),
        }
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Preference::Auto),
            other => other.parse::<Provider>().map(Preference::Only).map_err(|_| {
                format!("unknown provider '{other}'; valid: auto, claude, gemini")
            }),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
