//! Glob-style route patterns and route-class classification.
//!
//! A pattern is a literal path in which `*` matches any run of characters
//! (including `/`). Every pattern is anchored at both ends, is case-sensitive
//! and accepts one optional trailing slash:
//!
//! ```text
//! /login      matches /login, /login/
//! /admin/*    matches /admin/, /admin/settings, /admin/users/42
//! /static/*.css matches /static/site.css, /static/v2/site.css
//! ```
//!
//! Patterns are compiled once at startup into a [`RegexSet`]; matching is pure
//! and safe to share between concurrent requests.

use regex::RegexSet;
use std::fmt;

/// Translates one glob pattern into an anchored regular expression.
fn pattern_to_regex(pattern: &str) -> String {
    let trimmed = if pattern.len() > 1 {
        pattern.strip_suffix('/').unwrap_or(pattern)
    } else {
        pattern
    };

    let body = trimmed
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    format!("^{}/?$", body)
}

/// An ordered, compiled list of route patterns.
#[derive(Clone)]
pub struct RoutePatterns {
    sources: Vec<String>,
    set: RegexSet,
}

impl RoutePatterns {
    /// Compiles the given patterns.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the combined set exceeds the regex size
    /// limits; escaping guarantees every individual pattern is valid syntax.
    pub fn compile<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sources: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let set = RegexSet::new(sources.iter().map(|p| pattern_to_regex(p)))?;

        Ok(Self { sources, set })
    }

    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
            set: RegexSet::empty(),
        }
    }

    /// True if any pattern matches the whole path.
    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Debug for RoutePatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.sources).finish()
    }
}

impl Default for RoutePatterns {
    fn default() -> Self {
        Self::empty()
    }
}

/// One-shot form of [`RoutePatterns::matches`] for ad-hoc checks.
pub fn matches(path: &str, patterns: &[&str]) -> bool {
    RoutePatterns::compile(patterns)
        .map(|compiled| compiled.matches(path))
        .unwrap_or(false)
}

/// Named categories of routes, each with its own access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteClass {
    /// Skips all authentication work.
    Bypass,
    /// Requires the `admin` role.
    Admin,
    /// Requires a session; anonymous users go to the login page.
    Protected,
    /// Requires a session; anonymous users go to the login page and come back.
    ProtectedRedirect,
    /// Only for anonymous users; signed-in users go home.
    RedirectIfAuthenticated,
}

impl RouteClass {
    pub const ALL: [RouteClass; 5] = [
        RouteClass::Bypass,
        RouteClass::Admin,
        RouteClass::Protected,
        RouteClass::ProtectedRedirect,
        RouteClass::RedirectIfAuthenticated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Bypass => "bypass",
            RouteClass::Admin => "admin",
            RouteClass::Protected => "protected",
            RouteClass::ProtectedRedirect => "protected_redirect",
            RouteClass::RedirectIfAuthenticated => "redirect",
        }
    }
}

/// Which route classes a path belongs to. A path may be in several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMatch {
    pub bypass: bool,
    pub admin: bool,
    pub protected: bool,
    pub protected_redirect: bool,
    pub redirect: bool,
}

impl RouteMatch {
    pub fn contains(&self, class: RouteClass) -> bool {
        match class {
            RouteClass::Bypass => self.bypass,
            RouteClass::Admin => self.admin,
            RouteClass::Protected => self.protected,
            RouteClass::ProtectedRedirect => self.protected_redirect,
            RouteClass::RedirectIfAuthenticated => self.redirect,
        }
    }

    pub fn classes(&self) -> Vec<RouteClass> {
        RouteClass::ALL
            .into_iter()
            .filter(|class| self.contains(*class))
            .collect()
    }
}

/// The five compiled route sets of an application.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    pub bypass: RoutePatterns,
    pub admin: RoutePatterns,
    pub protected: RoutePatterns,
    pub protected_redirect: RoutePatterns,
    pub redirect: RoutePatterns,
}

impl RouteTable {
    pub fn patterns(&self, class: RouteClass) -> &RoutePatterns {
        match class {
            RouteClass::Bypass => &self.bypass,
            RouteClass::Admin => &self.admin,
            RouteClass::Protected => &self.protected,
            RouteClass::ProtectedRedirect => &self.protected_redirect,
            RouteClass::RedirectIfAuthenticated => &self.redirect,
        }
    }

    pub fn is_bypass(&self, path: &str) -> bool {
        self.bypass.matches(path)
    }

    pub fn classify(&self, path: &str) -> RouteMatch {
        RouteMatch {
            bypass: self.bypass.matches(path),
            admin: self.admin.matches(path),
            protected: self.protected.matches(path),
            protected_redirect: self.protected_redirect.matches(path),
            redirect: self.redirect.matches(path),
        }
    }
}
