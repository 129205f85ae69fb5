use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Confederation {
    UEFA,
    CONMEBOL,
    CONCACAF,
    CAF,
    AFC,
    OFC,
}

pub fn confed_label(confed: Confederation) -> &'static str {
    match confed {
        Confederation::AFC => "AFC",
        Confederation::CAF => "CAF",
        Confederation::CONCACAF => "CONCACAF",
        Confederation::CONMEBOL => "CONMEBOL",
        Confederation::UEFA => "UEFA",
        Confederation::OFC => "OFC",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct League {
    pub id: &'static str,
    pub name: &'static str,
    pub prompt_focus: &'static str,
    pub confederation: Option<Confederation>,
    pub is_popular: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nation {
    pub id: &'static str,
    pub name: &'static str,
    /// ISO 3166-1 alpha-2, or a subdivision code for the home nations.
    pub country_code: &'static str,
    pub prompt_focus: &'static str,
    pub confederation: Confederation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealtimeKind {
    Live,
    Upcoming,
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeCategory {
    pub kind: RealtimeKind,
    pub name: &'static str,
    pub prompt_focus: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Leagues,
    Nations,
    Realtime,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Leagues => "Leagues",
            ViewMode::Nations => "Nations",
            ViewMode::Realtime => "Match Center",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ViewMode::Leagues => ViewMode::Nations,
            ViewMode::Nations => ViewMode::Realtime,
            ViewMode::Realtime => ViewMode::Leagues,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    League,
    Nation,
    Realtime,
}

/// A selectable browsing target. Its prompt focus drives every AI prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    League(&'static League),
    Nation(&'static Nation),
    Realtime(&'static RealtimeCategory),
}

impl Entity {
    pub fn id(&self) -> &'static str {
        match self {
            Entity::League(l) => l.id,
            Entity::Nation(n) => n.id,
            Entity::Realtime(r) => realtime_id(r.kind),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Entity::League(l) => l.name,
            Entity::Nation(n) => n.name,
            Entity::Realtime(r) => r.name,
        }
    }

    pub fn prompt_focus(&self) -> &'static str {
        match self {
            Entity::League(l) => l.prompt_focus,
            Entity::Nation(n) => n.prompt_focus,
            Entity::Realtime(r) => r.prompt_focus,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::League(_) => EntityKind::League,
            Entity::Nation(_) => EntityKind::Nation,
            Entity::Realtime(_) => EntityKind::Realtime,
        }
    }

    pub fn is_realtime(&self) -> bool {
        self.kind() == EntityKind::Realtime
    }
}

fn realtime_id(kind: RealtimeKind) -> &'static str {
    match kind {
        RealtimeKind::Live => "live",
        RealtimeKind::Upcoming => "upcoming",
        RealtimeKind::Previous => "previous",
    }
}

/// Context used for player lookups when nothing is selected.
pub const GLOBAL_CONTEXT: &str = "Global Football";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabId {
    Review,
    Fixtures,
    Calendar,
    Highlights,
    Insights,
    Tactics,
    Predictions,
    Performance,
    Betting,
}

pub const TABS: [TabId; 9] = [
    TabId::Review,
    TabId::Fixtures,
    TabId::Calendar,
    TabId::Highlights,
    TabId::Insights,
    TabId::Tactics,
    TabId::Predictions,
    TabId::Performance,
    TabId::Betting,
];

impl TabId {
    pub fn label(self) -> &'static str {
        match self {
            TabId::Review => "Review",
            TabId::Fixtures => "Fixtures",
            TabId::Calendar => "Calendar",
            TabId::Highlights => "Highlights",
            TabId::Insights => "Insights",
            TabId::Tactics => "Tactics",
            TabId::Predictions => "Predictions",
            TabId::Performance => "Performance Data",
            TabId::Betting => "Betting Strategy",
        }
    }

    pub fn index(self) -> usize {
        TABS.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        TABS[(self.index() + 1) % TABS.len()]
    }

    pub fn prev(self) -> Self {
        TABS[(self.index() + TABS.len() - 1) % TABS.len()]
    }
}

pub fn entities_for(view: ViewMode) -> Vec<Entity> {
    match view {
        ViewMode::Leagues => LEAGUES.iter().map(Entity::League).collect(),
        ViewMode::Nations => NATIONS.iter().map(Entity::Nation).collect(),
        ViewMode::Realtime => REALTIME_CATEGORIES.iter().map(Entity::Realtime).collect(),
    }
}

pub fn popular_leagues() -> Vec<&'static League> {
    LEAGUES.iter().filter(|l| l.is_popular).collect()
}

pub fn find_entity(id: &str) -> Option<Entity> {
    [ViewMode::Leagues, ViewMode::Nations, ViewMode::Realtime]
        .into_iter()
        .flat_map(entities_for)
        .find(|e| e.id() == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NationSortKey {
    Name,
    Confederation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NationSort {
    pub key: NationSortKey,
    pub ascending: bool,
}

impl Default for NationSort {
    fn default() -> Self {
        Self {
            key: NationSortKey::Name,
            ascending: true,
        }
    }
}

impl NationSort {
    /// Same key flips the order; a new key starts ascending.
    pub fn toggle(self, key: NationSortKey) -> Self {
        if key == self.key {
            Self {
                key,
                ascending: !self.ascending,
            }
        } else {
            Self {
                key,
                ascending: true,
            }
        }
    }

    pub fn indicator(self, key: NationSortKey) -> &'static str {
        if key != self.key {
            "↕"
        } else if self.ascending {
            "↑"
        } else {
            "↓"
        }
    }
}

pub fn filter_nations(term: &str, sort: NationSort) -> Vec<&'static Nation> {
    let needle = term.trim().to_lowercase();
    let mut out: Vec<&'static Nation> = NATIONS
        .iter()
        .filter(|n| needle.is_empty() || n.name.to_lowercase().contains(&needle))
        .collect();
    out.sort_by(|a, b| {
        let ord = match sort.key {
            NationSortKey::Name => cmp_upper(a.name, b.name),
            NationSortKey::Confederation => {
                cmp_upper(confed_label(a.confederation), confed_label(b.confederation))
            }
        };
        if sort.ascending { ord } else { ord.reverse() }
    });
    out
}

fn cmp_upper(a: &str, b: &str) -> Ordering {
    a.to_uppercase().cmp(&b.to_uppercase())
}

const fn league(
    id: &'static str,
    name: &'static str,
    prompt_focus: &'static str,
    confederation: Option<Confederation>,
    is_popular: bool,
) -> League {
    League {
        id,
        name,
        prompt_focus,
        confederation,
        is_popular,
    }
}

const fn nation(
    id: &'static str,
    name: &'static str,
    country_code: &'static str,
    prompt_focus: &'static str,
    confederation: Confederation,
) -> Nation {
    Nation {
        id,
        name,
        country_code,
        prompt_focus,
        confederation,
    }
}

use Confederation::{AFC, CAF, CONCACAF, CONMEBOL, OFC, UEFA};

pub static LEAGUES: [League; 15] = [
    league("epl", "Premier League", "the English Premier League (EPL)", Some(UEFA), true),
    league("laliga", "La Liga", "Spain's La Liga", Some(UEFA), true),
    league("serie_a", "Serie A", "Italy's Serie A", Some(UEFA), true),
    league("bundesliga", "Bundesliga", "Germany's Bundesliga", Some(UEFA), true),
    league("ligue1", "Ligue 1", "France's Ligue 1", Some(UEFA), true),
    league("eredivisie", "Eredivisie", "the Dutch Eredivisie", Some(UEFA), false),
    league("primeira_liga", "Primeira Liga", "Portugal's Primeira Liga", Some(UEFA), false),
    league("mls", "Major League Soccer", "the American MLS", Some(CONCACAF), true),
    league("brasileirao", "Brasileirão", "Brazil's Serie A (Brasileirão)", Some(CONMEBOL), true),
    league("arg_primera", "Argentine Primera", "Argentine Primera División", Some(CONMEBOL), false),
    league("saudi_pro", "Saudi Pro League", "Saudi Pro League", Some(AFC), true),
    league("j_league", "J1 League", "Japan's J1 League", Some(AFC), false),
    league("serie_b", "Serie B", "Italy's Serie B", Some(UEFA), false),
    league("serie_c", "Serie C", "Italy's Serie C (Lega Pro)", Some(UEFA), false),
    league(
        "others",
        "Other Leagues",
        "other notable football leagues globally, focusing on major talking points or standout teams/players.",
        None,
        false,
    ),
];

pub static NATIONS: [Nation; 40] = [
    nation("arg", "Argentina", "AR", "the Argentinian national football team", CONMEBOL),
    nation("bra", "Brazil", "BR", "the Brazilian national football team", CONMEBOL),
    nation("uru", "Uruguay", "UY", "the Uruguayan national football team", CONMEBOL),
    nation("col", "Colombia", "CO", "the Colombian national football team", CONMEBOL),
    nation("chi", "Chile", "CL", "the Chilean national football team", CONMEBOL),
    nation("ecu", "Ecuador", "EC", "the Ecuadorian national football team", CONMEBOL),
    nation("par", "Paraguay", "PY", "the Paraguayan national football team", CONMEBOL),
    nation("per", "Peru", "PE", "the Peruvian national football team", CONMEBOL),
    nation("eng", "England", "GB-ENG", "the English national football team", UEFA),
    nation("fra", "France", "FR", "the French national football team", UEFA),
    nation("ger", "Germany", "DE", "the German national football team", UEFA),
    nation("ita", "Italy", "IT", "the Italian national football team", UEFA),
    nation("esp", "Spain", "ES", "the Spanish national football team", UEFA),
    nation("por", "Portugal", "PT", "the Portuguese national football team", UEFA),
    nation("ned", "Netherlands", "NL", "the Dutch national football team", UEFA),
    nation("bel", "Belgium", "BE", "the Belgian national football team", UEFA),
    nation("cro", "Croatia", "HR", "the Croatian national football team", UEFA),
    nation("den", "Denmark", "DK", "the Danish national football team", UEFA),
    nation("sui", "Switzerland", "CH", "the Swiss national football team", UEFA),
    nation("tur", "Turkey", "TR", "the Turkish national football team", UEFA),
    nation("sen", "Senegal", "SN", "the Senegalese national football team", CAF),
    nation("mar", "Morocco", "MA", "the Moroccan national football team", CAF),
    nation("nga", "Nigeria", "NG", "the Nigerian national football team", CAF),
    nation("egy", "Egypt", "EG", "the Egyptian national football team", CAF),
    nation("gha", "Ghana", "GH", "the Ghanaian national football team", CAF),
    nation("civ", "Ivory Coast", "CI", "the Ivorian national football team", CAF),
    nation("cmr", "Cameroon", "CM", "the Cameroonian national football team", CAF),
    nation("alg", "Algeria", "DZ", "the Algerian national football team", CAF),
    nation("jpn", "Japan", "JP", "the Japanese national football team", AFC),
    nation("kor", "South Korea", "KR", "the South Korean national football team", AFC),
    nation("aus", "Australia", "AU", "the Australian national football team (Socceroos)", AFC),
    nation("irn", "Iran", "IR", "the Iranian national football team", AFC),
    nation("ksa", "Saudi Arabia", "SA", "the Saudi Arabian national football team", AFC),
    nation("qat", "Qatar", "QA", "the Qatari national football team", AFC),
    nation("usa", "USA", "US", "the United States men's national soccer team (USMNT)", CONCACAF),
    nation("mex", "Mexico", "MX", "the Mexican national football team", CONCACAF),
    nation("can", "Canada", "CA", "the Canadian men's national soccer team", CONCACAF),
    nation("crc", "Costa Rica", "CR", "the Costa Rican national football team", CONCACAF),
    nation("jam", "Jamaica", "JM", "the Jamaican national football team (Reggae Boyz)", CONCACAF),
    nation("nzl", "New Zealand", "NZ", "the New Zealand national football team (All Whites)", OFC),
];

pub static REALTIME_CATEGORIES: [RealtimeCategory; 3] = [
    RealtimeCategory {
        kind: RealtimeKind::Live,
        name: "Live Matches",
        prompt_focus: "live or very recently finished key football matches happening right now globally",
    },
    RealtimeCategory {
        kind: RealtimeKind::Upcoming,
        name: "Upcoming Matches",
        prompt_focus: "major upcoming football matches in the next 24-48 hours",
    },
    RealtimeCategory {
        kind: RealtimeKind::Previous,
        name: "Previous Matches",
        prompt_focus: "recently completed key football matches from around the world from the last 24 hours",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_are_unique() {
        let mut ids: Vec<&str> = [ViewMode::Leagues, ViewMode::Nations, ViewMode::Realtime]
            .into_iter()
            .flat_map(entities_for)
            .map(|e| e.id())
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        // "upcoming" (realtime) and league ids never collide.
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(TabId::Review.next(), TabId::Fixtures);
        assert_eq!(TabId::Review.prev(), TabId::Betting);
        assert_eq!(TabId::Betting.next(), TabId::Review);
    }

    #[test]
    fn nation_filter_is_case_insensitive() {
        let hits = filter_nations("ARG", NationSort::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Argentina");
    }

    #[test]
    fn nation_sort_toggles_direction() {
        let sort = NationSort::default().toggle(NationSortKey::Name);
        assert!(!sort.ascending);
        let all = filter_nations("", sort);
        assert_eq!(all.first().map(|n| n.name), Some("USA"));

        let by_confed = sort.toggle(NationSortKey::Confederation);
        assert!(by_confed.ascending);
        let all = filter_nations("", by_confed);
        assert_eq!(all.first().map(|n| n.confederation), Some(AFC));
        assert_eq!(by_confed.indicator(NationSortKey::Name), "↕");
    }

    #[test]
    fn popular_leagues_subset() {
        let popular = popular_leagues();
        assert!(popular.iter().all(|l| l.is_popular));
        assert!(popular.iter().any(|l| l.id == "epl"));
        assert!(!popular.iter().any(|l| l.id == "serie_c"));
    }

    #[test]
    fn find_entity_by_id() {
        let e = find_entity("bra").expect("brazil");
        assert_eq!(e.kind(), EntityKind::Nation);
        assert_eq!(e.name(), "Brazil");
        assert!(find_entity("live").is_some_and(|e| e.is_realtime()));
        assert!(find_entity("nope").is_none());
    }
}
