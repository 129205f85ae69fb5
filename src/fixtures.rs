//! Turns the loosely structured fixtures prose returned by the AI service into
//! two display tables (recent results and upcoming fixtures).
//!
//! Parsing never fails. A line that cannot be decomposed becomes a raw row that
//! keeps the original text, so nothing the model wrote is lost.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::content::MatchInfo;

pub const DEFAULT_CONTEXT: &str = "N/A";
pub const HEADER_CONTEXT: &str = "General Info";
pub const LOOSE_LINE_CONTEXT: &str = "General Information";
pub const UNPARSED_NOTICE: &str =
    "Could not parse specific fixtures. Raw data might be available but not in a recognized format.";

const RECENT_HEADER: &str = "recent:";
const UPCOMING_HEADER: &str = "upcoming:";

static RECENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s+([0-9]+\s*-\s*[0-9]+)\s+(.*?)(?:\s+\((.*)\))?$")
        .expect("recent line pattern")
});
static UPCOMING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s+vs\s+(.*?)(?:\s+\((.*)\))?$").expect("upcoming line pattern")
});
static SCORE_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+\s*-\s*[0-9]+").expect("score pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    None,
    Recent,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFixtureRow {
    pub home_team: String,
    pub away_team: String,
    pub score: Option<String>,
    pub context: String,
    /// When set, `home_team` carries the whole source line and nothing else is meaningful.
    pub is_raw: bool,
}

impl ParsedFixtureRow {
    pub fn raw(text: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            home_team: text.into(),
            away_team: String::new(),
            score: None,
            context: context.into(),
            is_raw: true,
        }
    }

    fn from_match(line: &str, matched: LineMatch) -> Self {
        match matched {
            LineMatch::Matched {
                home,
                away,
                score,
                context,
            } => Self {
                home_team: home,
                away_team: away,
                score,
                context,
                is_raw: false,
            },
            LineMatch::Unmatched => Self::raw(line, ""),
        }
    }

    /// The payload for the "Analyze" action. Raw rows cannot be analyzed.
    pub fn to_match_info(&self, is_future: bool, entity_name: &str) -> Option<MatchInfo> {
        if self.is_raw {
            return None;
        }
        Some(MatchInfo {
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            context: self.context.clone(),
            score: self.score.clone(),
            date: None,
            is_future,
            entity_name: entity_name.to_string(),
        })
    }
}

/// Outcome of one recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    Matched {
        home: String,
        away: String,
        score: Option<String>,
        context: String,
    },
    Unmatched,
}

impl LineMatch {
    pub fn is_matched(&self) -> bool {
        matches!(self, LineMatch::Matched { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixtureTables {
    pub recent: Vec<ParsedFixtureRow>,
    pub upcoming: Vec<ParsedFixtureRow>,
}

impl FixtureTables {
    /// Both tables empty: the caller shows [`UNPARSED_NOTICE`] instead.
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty() && self.upcoming.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recent.len() + self.upcoming.len()
    }

    /// Structured rows in display order (recent table first), tagged with `is_future`.
    pub fn analyzable_rows(&self) -> Vec<(bool, &ParsedFixtureRow)> {
        self.recent
            .iter()
            .map(|row| (false, row))
            .chain(self.upcoming.iter().map(|row| (true, row)))
            .filter(|(_, row)| !row.is_raw)
            .collect()
    }
}

/// Splits on literal `\n` escape sequences as well as real line breaks.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split("\\n")
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Returns the section a header line opens plus whatever follows the colon.
pub fn header_section(line: &str) -> Option<(Section, &str)> {
    for (prefix, section) in [
        (RECENT_HEADER, Section::Recent),
        (UPCOMING_HEADER, Section::Upcoming),
    ] {
        let Some(head) = line.get(..prefix.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(prefix) {
            return Some((section, line[prefix.len()..].trim()));
        }
    }
    None
}

pub fn recognize_recent_line(line: &str) -> LineMatch {
    let Some(caps) = RECENT_LINE.captures(line) else {
        return LineMatch::Unmatched;
    };
    LineMatch::Matched {
        home: caps[1].trim().to_string(),
        away: caps[3].trim().to_string(),
        score: Some(caps[2].trim().to_string()),
        context: context_or_default(caps.get(4).map(|m| m.as_str())),
    }
}

pub fn recognize_upcoming_line(line: &str) -> LineMatch {
    let Some(caps) = UPCOMING_LINE.captures(line) else {
        return LineMatch::Unmatched;
    };
    LineMatch::Matched {
        home: caps[1].trim().to_string(),
        away: caps[2].trim().to_string(),
        score: None,
        context: context_or_default(caps.get(3).map(|m| m.as_str())),
    }
}

fn context_or_default(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(ctx) if !ctx.is_empty() => ctx.to_string(),
        _ => DEFAULT_CONTEXT.to_string(),
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    section: Section,
    tables: FixtureTables,
}

impl Accumulator {
    fn consume(mut self, line: &str) -> Self {
        if let Some((section, rest)) = header_section(line) {
            self.section = section;
            if !rest.is_empty() {
                self.push(section, ParsedFixtureRow::raw(rest, HEADER_CONTEXT));
            }
            return self;
        }

        match self.section {
            Section::Recent => {
                let row = ParsedFixtureRow::from_match(line, recognize_recent_line(line));
                self.push(Section::Recent, row);
            }
            Section::Upcoming => {
                let row = ParsedFixtureRow::from_match(line, recognize_upcoming_line(line));
                self.push(Section::Upcoming, row);
            }
            Section::None => {
                // vs-check first, then score-check.
                if line.contains(" vs ") {
                    let row = ParsedFixtureRow::from_match(line, recognize_upcoming_line(line));
                    self.push(Section::Upcoming, row);
                } else if SCORE_LIKE.is_match(line) {
                    let row = ParsedFixtureRow::from_match(line, recognize_recent_line(line));
                    self.push(Section::Recent, row);
                } else {
                    self.push(
                        Section::Upcoming,
                        ParsedFixtureRow::raw(line, LOOSE_LINE_CONTEXT),
                    );
                }
            }
        }
        self
    }

    fn push(&mut self, section: Section, row: ParsedFixtureRow) {
        match section {
            Section::Recent => self.tables.recent.push(row),
            Section::Upcoming | Section::None => self.tables.upcoming.push(row),
        }
    }
}

pub fn parse_fixtures(text: &str) -> FixtureTables {
    split_lines(text)
        .into_iter()
        .fold(Accumulator::default(), Accumulator::consume)
        .tables
}
